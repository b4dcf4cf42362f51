//! X11 window lookup through `wmctrl`, `xdotool`, `xprop` and `xwininfo`.

use crate::focus::focus_window;
use crate::Result;
use anyhow::{bail, Context};
use petbot_core::geometry::Rect;
use petbot_core::traits::WindowLocator;
use petbot_core::window::{Identifier, TitleMatch, WindowHandle, WindowInfo};
use std::process::Command;
use std::{fs, io};
use tracing::{debug, warn};

/// One line of `wmctrl -lp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmctrlEntry {
    pub handle: WindowHandle,
    pub pid: u32,
    pub title: String,
}

/// Locator shelling out to the usual X11 utilities
#[derive(Debug, Default, Clone, Copy)]
pub struct X11ToolsLocator;

impl X11ToolsLocator {
    pub fn new() -> Self {
        Self
    }

    fn entries(&self) -> Result<Vec<WmctrlEntry>> {
        Ok(parse_wmctrl(&run_tool("wmctrl", &["-lp"])?))
    }

    fn with_geometry(&self, handle: WindowHandle, pid: u32, title: String) -> WindowInfo {
        let rect = self.geometry(handle).unwrap_or_else(|err| {
            debug!(%handle, error = %err, "no geometry for window");
            Rect::default()
        });
        WindowInfo {
            handle,
            pid,
            process_name: process_name(pid),
            title,
            rect,
        }
    }

    fn find_in_wmctrl(&self, identifier: &Identifier) -> Result<Option<WindowInfo>> {
        let candidates = self.entries()?.into_iter().map(|entry| WindowInfo {
            handle: entry.handle,
            pid: entry.pid,
            process_name: process_name(entry.pid),
            title: entry.title,
            rect: Rect::default(),
        });
        Ok(first_with_geometry(candidates, identifier, |handle| {
            self.geometry(handle)
        }))
    }

    fn find_by_title(&self, title: &str, mode: TitleMatch) -> Result<Option<WindowInfo>> {
        let found = match mode {
            TitleMatch::Contains => match search_with_xdotool(title) {
                Err(err) if tool_missing(&err) => {
                    debug!("xdotool not available, scanning client list with xprop");
                    scan_client_list(title, mode)?
                }
                other => other?,
            },
            TitleMatch::Exact => scan_client_list(title, mode)?,
        };

        Ok(found.map(|(handle, name)| {
            let pid = window_pid(handle).unwrap_or(0);
            self.with_geometry(handle, pid, name)
        }))
    }
}

impl WindowLocator for X11ToolsLocator {
    fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| !entry.title.is_empty() && entry.title != "N/A")
            .map(|entry| self.with_geometry(entry.handle, entry.pid, entry.title))
            .collect())
    }

    fn find(&self, identifier: &Identifier) -> Result<Option<WindowInfo>> {
        match identifier {
            Identifier::Title(title, mode) => self.find_by_title(title, *mode),
            _ => self.find_in_wmctrl(identifier),
        }
    }

    fn geometry(&self, handle: WindowHandle) -> Result<Rect> {
        let output = run_tool("xwininfo", &["-id", &handle.to_string()])?;
        parse_xwininfo(&output).with_context(|| format!("Unexpected xwininfo output for {handle}"))
    }

    fn activate(&self, handle: WindowHandle) -> Result<()> {
        focus_window(handle)
    }
}

/// First candidate matching `identifier` whose geometry can be read
fn first_with_geometry(
    candidates: impl IntoIterator<Item = WindowInfo>,
    identifier: &Identifier,
    geometry: impl Fn(WindowHandle) -> Result<Rect>,
) -> Option<WindowInfo> {
    for candidate in candidates {
        if !identifier.matches(&candidate) {
            continue;
        }
        match geometry(candidate.handle) {
            Ok(rect) => return Some(WindowInfo { rect, ..candidate }),
            Err(err) => {
                warn!(handle = %candidate.handle, error = %err, "no geometry for matching window, trying next");
            }
        }
    }
    None
}

fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute command: {} {:?}", program, args))?;
    if !output.status.success() {
        bail!("{} failed with status {:?}", program, output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn tool_missing(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

/// `xdotool search --name` ignores case, so its hits are re-checked
/// against the exact window name.
fn search_with_xdotool(title: &str) -> Result<Option<(WindowHandle, String)>> {
    let pattern = regex::escape(title);
    let output = Command::new("xdotool")
        .args(["search", "--name", &pattern])
        .output()
        .context("failed to execute command: xdotool search")?;
    // xdotool exits non-zero when nothing matched
    if !output.status.success() {
        return Ok(None);
    }

    for handle in parse_xdotool_search(&String::from_utf8_lossy(&output.stdout)) {
        let name = match run_tool("xdotool", &["getwindowname", &handle.0.to_string()]) {
            Ok(name) => name.trim_end_matches('\n').to_string(),
            Err(err) => {
                debug!(%handle, error = %err, "no name for window");
                continue;
            }
        };
        if TitleMatch::Contains.matches(&name, title) {
            return Ok(Some((handle, name)));
        }
    }
    Ok(None)
}

fn scan_client_list(title: &str, mode: TitleMatch) -> Result<Option<(WindowHandle, String)>> {
    let output = run_tool("xprop", &["-root", "_NET_CLIENT_LIST_STACKING"])?;
    for handle in parse_client_list(&output) {
        let Some(name) = window_name(handle) else {
            continue;
        };
        if mode.matches(&name, title) {
            return Ok(Some((handle, name)));
        }
    }
    Ok(None)
}

fn window_name(handle: WindowHandle) -> Option<String> {
    let output = run_tool("xprop", &["-id", &handle.to_string(), "WM_NAME"]).ok()?;
    parse_xprop_string(&output)
}

fn window_pid(handle: WindowHandle) -> Option<u32> {
    let output = run_tool("xprop", &["-id", &handle.to_string(), "_NET_WM_PID"]).ok()?;
    parse_xprop_cardinal(&output)
}

/// Longest name the kernel keeps in `/proc/<pid>/comm`
const COMM_LEN: usize = 15;

/// Name of a process from procfs, empty if it cannot be read
fn process_name(pid: u32) -> String {
    if pid == 0 {
        return String::new();
    }
    let comm = fs::read_to_string(format!("/proc/{pid}/comm")).unwrap_or_default();
    let comm = comm.trim_end_matches('\n');
    if comm.len() < COMM_LEN {
        return comm.to_string();
    }
    let cmdline = fs::read(format!("/proc/{pid}/cmdline")).unwrap_or_default();
    full_process_name(comm, &String::from_utf8_lossy(&cmdline))
}

/// Undo `comm` truncation using the basename of `argv[0]` when it extends
/// the truncated name
pub fn full_process_name(comm: &str, cmdline: &str) -> String {
    if comm.len() >= COMM_LEN {
        let arg0 = cmdline.split('\0').next().unwrap_or_default();
        let base = arg0.rsplit('/').next().unwrap_or_default();
        if base.len() > comm.len() && base.starts_with(comm) {
            return base.to_string();
        }
    }
    comm.to_string()
}

fn parse_hex_id(text: &str) -> Option<WindowHandle> {
    let digits = text.trim().strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok().map(WindowHandle)
}

/// Split off the next whitespace-delimited field
fn next_field(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(text.split_at(text.find(char::is_whitespace).unwrap_or(text.len())))
}

/// Parse `wmctrl -lp`: `<id> <desktop> <pid> <host> <title>`
pub fn parse_wmctrl(output: &str) -> Vec<WmctrlEntry> {
    output
        .lines()
        .filter_map(|line| {
            let (id, rest) = next_field(line)?;
            let (desktop, rest) = next_field(rest)?;
            let (pid, rest) = next_field(rest)?;
            let (_host, rest) = next_field(rest)?;
            desktop.parse::<i32>().ok()?;
            Some(WmctrlEntry {
                handle: parse_hex_id(id)?,
                pid: pid.parse().ok()?,
                title: rest.trim().to_string(),
            })
        })
        .collect()
}

/// Parse the absolute position and size out of `xwininfo -id`
pub fn parse_xwininfo(output: &str) -> Option<Rect> {
    let mut x = None;
    let mut y = None;
    let mut width = None;
    let mut height = None;

    for line in output.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Absolute upper-left X:") {
            x = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix("Absolute upper-left Y:") {
            y = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix("Width:") {
            width = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix("Height:") {
            height = value.trim().parse().ok();
        }
    }

    Some(Rect::new(x?, y?, width?, height?))
}

/// Decimal ids printed by `xdotool search`, in output order
pub fn parse_xdotool_search(output: &str) -> Vec<WindowHandle> {
    output
        .lines()
        .filter_map(|line| line.trim().parse::<u64>().ok())
        .map(WindowHandle)
        .collect()
}

/// Window ids from `xprop -root _NET_CLIENT_LIST_STACKING`
pub fn parse_client_list(output: &str) -> Vec<WindowHandle> {
    output
        .lines()
        .find_map(|line| line.split_once("# ").map(|(_, ids)| ids))
        .map(|ids| ids.split(',').filter_map(parse_hex_id).collect())
        .unwrap_or_default()
}

/// Value of a string property line such as `WM_NAME(STRING) = "title"`
pub fn parse_xprop_string(output: &str) -> Option<String> {
    let (_, value) = output.lines().next()?.split_once(" = ")?;
    let value = value.trim();
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.replace("\\\"", "\"").replace("\\\\", "\\"))
}

/// Value of a cardinal property line such as `_NET_WM_PID(CARDINAL) = 1234`
pub fn parse_xprop_cardinal(output: &str) -> Option<u32> {
    let (_, value) = output.lines().next()?.split_once(" = ")?;
    value.trim().parse().ok()
}
