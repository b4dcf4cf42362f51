//! Bringing a window to the foreground

use crate::Result;
use petbot_core::window::WindowHandle;

#[cfg(target_os = "windows")]
pub fn focus_window(handle: WindowHandle) -> Result<()> {
    use windows_sys::Win32::Foundation::HWND;
    use windows_sys::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

    let hwnd = handle.0 as usize as HWND;
    // SAFETY: SetForegroundWindow only reads the handle and fails on stale ones
    let ok = unsafe { SetForegroundWindow(hwnd) };
    anyhow::ensure!(ok != 0, "SetForegroundWindow failed for {}", handle);
    Ok(())
}

#[cfg(all(unix, not(target_os = "macos")))]
pub fn focus_window(handle: WindowHandle) -> Result<()> {
    use anyhow::{bail, Context};
    use std::process::Command;

    let status = Command::new("xdotool")
        .arg("windowactivate")
        .arg("--sync")
        .arg(handle.0.to_string())
        .status()
        .context("failed to execute command: xdotool windowactivate")?;
    if !status.success() {
        bail!("xdotool failed with status {:?}", status);
    }
    Ok(())
}

#[cfg(target_os = "macos")]
pub fn focus_window(handle: WindowHandle) -> Result<()> {
    tracing::debug!(%handle, "window focusing is not supported on macOS");
    Ok(())
}
