//! Serial-number recovery from raw EDID blobs.
//!
//! Only the pieces needed for a durable display identity are decoded: the
//! display descriptors of the base block and extension blocks, and the binary
//! serial field of the vendor/product section.

const BLOCK_LEN: usize = 128;
const DESCRIPTOR_LEN: usize = 18;
const DESCRIPTOR_OFFSETS: [usize; 4] = [54, 72, 90, 108];
const EXTENSION_COUNT_OFFSET: usize = 126;
const BINARY_SERIAL_OFFSET: usize = 12;

const TAG_SERIAL: u8 = 0xFF;
const TAG_ASCII: u8 = 0xFE;

const ENUM_ROOT: &str = r"SYSTEM\CurrentControlSet\Enum";

/// Extract the most trustworthy serial number from an EDID blob.
///
/// Preference order: serial descriptor (`0xFF`) in the base block, ASCII
/// descriptor (`0xFE`) in the base block, the same two in extension blocks,
/// then the 32-bit binary serial rendered as hex.
pub fn parse_serial(edid: &[u8]) -> Option<String> {
    let base = edid.get(..BLOCK_LEN)?;
    if let Some(serial) = block_serial(base) {
        return Some(serial);
    }

    let extensions = usize::from(base[EXTENSION_COUNT_OFFSET]);
    let from_extensions = edid[BLOCK_LEN..]
        .chunks_exact(BLOCK_LEN)
        .take(extensions)
        .find_map(block_serial);
    if from_extensions.is_some() {
        return from_extensions;
    }

    binary_serial(base)
}

/// Serial from one 128-byte block, `0xFF` descriptors winning over `0xFE`.
fn block_serial(block: &[u8]) -> Option<String> {
    descriptor_text(block, TAG_SERIAL).or_else(|| descriptor_text(block, TAG_ASCII))
}

fn descriptor_text(block: &[u8], tag: u8) -> Option<String> {
    DESCRIPTOR_OFFSETS
        .iter()
        .filter_map(|&offset| block.get(offset..offset + DESCRIPTOR_LEN))
        .filter(|d| d[0] == 0 && d[1] == 0 && d[2] == 0 && d[3] == tag)
        .find_map(|d| {
            let text = descriptor_payload(&d[5..]);
            is_plausible_serial(&text).then_some(text)
        })
}

/// Up to 13 ASCII bytes, terminated by a newline or NUL.
fn descriptor_payload(payload: &[u8]) -> String {
    payload
        .iter()
        .take_while(|&&b| b != b'\n' && b != 0)
        .map(|&b| if b.is_ascii() { char::from(b) } else { '?' })
        .collect::<String>()
        .trim()
        .to_string()
}

fn binary_serial(base: &[u8]) -> Option<String> {
    let bytes: [u8; 4] = base
        .get(BINARY_SERIAL_OFFSET..BINARY_SERIAL_OFFSET + 4)?
        .try_into()
        .ok()?;
    match u32::from_le_bytes(bytes) {
        0 | u32::MAX => None,
        value => Some(format!("{value:08X}")),
    }
}

/// Rejects empty, all-zero, all-`F` and punctuation-only candidates.
pub fn is_plausible_serial(candidate: &str) -> bool {
    !candidate.is_empty()
        && !candidate.chars().all(|c| c == '0')
        && !candidate.chars().all(|c| c.eq_ignore_ascii_case(&'f'))
        && candidate.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Registry key holding the `EDID` value for a monitor device interface path.
///
/// `\\?\DISPLAY#GSM5B08#5&2a0c3a5f&0&UID4352#{e6f07b5f-...}` maps to
/// `SYSTEM\CurrentControlSet\Enum\DISPLAY\GSM5B08\5&2a0c3a5f&0&UID4352\Device Parameters`.
pub fn device_parameters_key(device_path: &str) -> Option<String> {
    let trimmed = device_path
        .strip_prefix(r"\\?\")
        .or_else(|| device_path.strip_prefix(r"\\.\"))
        .unwrap_or(device_path);
    let mut parts = trimmed.split('#');
    let class = parts.next().filter(|s| !s.is_empty())?;
    let hardware_id = parts.next().filter(|s| !s.is_empty())?;
    let instance = parts.next().filter(|s| !s.is_empty())?;
    Some(format!(
        r"{ENUM_ROOT}\{class}\{hardware_id}\{instance}\Device Parameters"
    ))
}
