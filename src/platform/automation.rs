use windows::Win32::Foundation::HWND;
use windows::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx,
    CoUninitialize,
};
use windows::Win32::System::Variant::VARIANT;
use windows::Win32::UI::Accessibility::{
    CUIAutomation, IUIAutomation, IUIAutomationElement, TreeScope_Children,
    UIA_ClassNamePropertyId, UIA_NamePropertyId,
};
use windows::core::BSTR;

use super::window::Win32Window;
use crate::connection::OnceConnection;
use crate::error::Result;

/// Balances a successful `CoInitializeEx` on drop.
struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    fn init() -> Self {
        // RPC_E_CHANGED_MODE means the thread already has an apartment; use it.
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        Self {
            initialized: hr.is_ok(),
        }
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { CoUninitialize() };
        }
    }
}

struct Client {
    uia: IUIAutomation,
    root: IUIAutomationElement,
    // Last, so the interfaces above are released before the apartment goes.
    _com: ComGuard,
}

impl Client {
    fn connect() -> std::result::Result<Self, String> {
        let com = ComGuard::init();
        let uia: IUIAutomation = unsafe { CoCreateInstance(&CUIAutomation, None, CLSCTX_INPROC_SERVER) }
            .map_err(|e| format!("could not create automation client: {e}"))?;
        let root = unsafe { uia.GetRootElement() }
            .map_err(|e| format!("could not get desktop element: {e}"))?;
        tracing::debug!("UI Automation client ready");
        Ok(Self {
            uia,
            root,
            _com: com,
        })
    }
}

/// Lazily created UI Automation client with a cached desktop root.
/// Lives on the UI thread. Connection is attempted once per session.
#[derive(Default)]
pub struct Automation {
    client: OnceConnection<Client>,
}

impl Automation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_ready(&self) -> Result<()> {
        self.client.get_or_connect(Client::connect).map(|_| ())
    }

    /// First direct child of the desktop with this exact name and class.
    pub fn find_top_level(&self, name: &str, class_name: &str) -> Result<Option<Win32Window>> {
        let client = self.client.get_or_connect(Client::connect)?;

        unsafe {
            let by_name = client
                .uia
                .CreatePropertyCondition(UIA_NamePropertyId, &VARIANT::from(BSTR::from(name)))?;
            let by_class = client.uia.CreatePropertyCondition(
                UIA_ClassNamePropertyId,
                &VARIANT::from(BSTR::from(class_name)),
            )?;
            let both = client.uia.CreateAndCondition(&by_name, &by_class)?;

            // No match comes back as an error carrying a success code.
            let element = match client.root.FindFirst(TreeScope_Children, &both) {
                Ok(element) => element,
                Err(e) if e.code().is_ok() => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let handle = element.CurrentNativeWindowHandle()?;
            if handle.0.is_null() {
                tracing::debug!(name, class_name, "matched element has no native window");
                return Ok(None);
            }
            Ok(Some(Win32Window::new(HWND(handle.0), Some(element))))
        }
    }
}
