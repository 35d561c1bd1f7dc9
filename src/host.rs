//! Glue around the host OS: CPU temperature, network reachability, and
//! the Wi-Fi/IP lookups used by the startup info screen. Everything here
//! degrades to a placeholder rather than failing.

use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::process::{Command, Stdio};
use std::time::Duration;

const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// CPU temperature as shown on the display, e.g. `48.25 C`, or `N/A`.
pub fn cpu_temp() -> String {
    read_cpu_temp(THERMAL_ZONE).unwrap_or_else(|| "N/A".to_string())
}

fn read_cpu_temp(path: &str) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let millidegrees: f64 = raw.trim().parse().ok()?;
    Some(format!("{:.2} C", millidegrees / 1000.0))
}

/// Quick reachability probe: TCP connect to a well-known public resolver.
/// Used only to decide between poll mode and local-only mode.
pub fn network_available(timeout: Duration) -> bool {
    let resolver = SocketAddr::from(([1, 1, 1, 1], 53));
    TcpStream::connect_timeout(&resolver, timeout).is_ok()
}

/// Primary outbound IPv4 address, via the connected-UDP-socket trick
/// (no packet is actually sent).
pub fn ip_address() -> String {
    let addr = UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|local| local.ip().to_string());
    addr.unwrap_or_else(|_| "N/A".to_string())
}

/// Connected Wi-Fi SSID via `iwgetid -r`, falling back to `nmcli`.
pub fn wifi_ssid() -> String {
    if let Some(ssid) = ssid_from_iwgetid() {
        return ssid;
    }
    if let Some(ssid) = ssid_from_nmcli() {
        return ssid;
    }
    "Unknown".to_string()
}

fn ssid_from_iwgetid() -> Option<String> {
    let output = Command::new("iwgetid")
        .arg("-r")
        .stderr(Stdio::null())
        .output()
        .ok()?;
    let ssid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if ssid.is_empty() {
        None
    } else {
        Some(ssid)
    }
}

fn ssid_from_nmcli() -> Option<String> {
    let output = Command::new("nmcli")
        .args(["-t", "-f", "ACTIVE,SSID", "dev", "wifi"])
        .stderr(Stdio::null())
        .output()
        .ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(ssid) = line.strip_prefix("yes:") {
            if !ssid.is_empty() {
                return Some(ssid.to_string());
            }
        }
    }
    None
}
