fn main() {
    // Version metadata only matters for the Windows executable.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    let res = winresource::WindowsResource::new();
    if let Err(e) = res.compile() {
        println!("cargo:warning=failed to embed version resource: {e}");
    }
}
