//! Wi-Fi station link for the network console.
//!
//! Joins once at boot with the build-time credentials, then only watches
//! the link.  There is no reconnect policy: once the link has been up, a
//! drop surfaces as [`TransportFault::LinkDown`] and the caller restarts
//! the device.
//!
//! On `espidf` this drives `esp_idf_svc::wifi::BlockingWifi`; elsewhere a
//! simulated link lets host tests exercise the state handling.

use core::fmt;
use core::net::Ipv4Addr;

use log::{error, info, warn};

use crate::error::TransportFault;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

const MAX_SSID_LEN: usize = 32;
const MAX_PASS_LEN: usize = 64;
const MIN_WPA_PASS_LEN: usize = 8;

/// Why the station could not be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// `connect` before any credentials were set.
    NoCredentials,
    BadSsid,
    BadPassphrase,
    /// The driver refused or the AP never handed out an address.
    Driver,
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoCredentials => "no station credentials",
            Self::BadSsid => "SSID must be 1-32 printable ASCII bytes",
            Self::BadPassphrase => "passphrase must be empty (open) or 8-64 bytes",
            Self::Driver => "station join failed",
        })
    }
}

impl core::error::Error for JoinError {}

/// Station credentials, checked on construction.
#[derive(Debug, Clone)]
pub struct Credentials {
    ssid: heapless::String<MAX_SSID_LEN>,
    passphrase: heapless::String<MAX_PASS_LEN>,
}

impl Credentials {
    pub fn new(ssid: &str, passphrase: &str) -> Result<Self, JoinError> {
        let printable = ssid.bytes().all(|b| b.is_ascii_graphic() || b == b' ');
        if ssid.is_empty() || !printable {
            return Err(JoinError::BadSsid);
        }
        if !passphrase.is_empty() && passphrase.len() < MIN_WPA_PASS_LEN {
            return Err(JoinError::BadPassphrase);
        }
        let mut creds = Self {
            ssid: heapless::String::new(),
            passphrase: heapless::String::new(),
        };
        creds.ssid.push_str(ssid).map_err(|()| JoinError::BadSsid)?;
        creds
            .passphrase
            .push_str(passphrase)
            .map_err(|()| JoinError::BadPassphrase)?;
        Ok(creds)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Open network (no passphrase).
    pub fn is_open(&self) -> bool {
        self.passphrase.is_empty()
    }
}

/// Station link as seen by the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Down,
    Joining,
    Up,
    /// Was up, then dropped.  Stays here until restart.
    Lost,
}

pub struct WifiAdapter {
    link: LinkState,
    credentials: Option<Credentials>,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            link: LinkState::Down,
            credentials: None,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            link: LinkState::Down,
            credentials: None,
            sim_up: false,
        }
    }

    pub fn state(&self) -> LinkState {
        self.link
    }

    pub fn set_credentials(&mut self, ssid: &str, passphrase: &str) -> Result<(), JoinError> {
        let creds = Credentials::new(ssid, passphrase)?;
        info!("WiFi: station SSID '{}'", creds.ssid());
        self.credentials = Some(creds);
        Ok(())
    }

    /// Join and wait for an address.  Blocks.
    pub fn connect(&mut self) -> Result<(), JoinError> {
        let Some(creds) = self.credentials.clone() else {
            return Err(JoinError::NoCredentials);
        };
        self.link = LinkState::Joining;
        info!("WiFi: joining '{}'", creds.ssid());
        if let Err(e) = self.join(&creds) {
            error!("WiFi: {e}");
            self.link = LinkState::Down;
            return Err(e);
        }
        self.link = LinkState::Up;
        info!("WiFi: up, ip={:?}", self.ip());
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.link == LinkState::Up
    }

    /// Check the link once per loop iteration.
    pub fn poll(&mut self) -> Result<(), TransportFault> {
        match self.link {
            LinkState::Up if !self.link_up() => {
                warn!("WiFi: link lost");
                self.link = LinkState::Lost;
                Err(TransportFault::LinkDown)
            }
            LinkState::Lost => Err(TransportFault::LinkDown),
            _ => Ok(()),
        }
    }

    #[cfg(target_os = "espidf")]
    fn join(&mut self, creds: &Credentials) -> Result<(), JoinError> {
        let config = Configuration::Client(ClientConfiguration {
            ssid: creds.ssid.clone(),
            password: creds.passphrase.clone(),
            auth_method: if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });
        let driver = |e: esp_idf_svc::sys::EspError| {
            error!("WiFi driver: {e}");
            JoinError::Driver
        };
        self.wifi.set_configuration(&config).map_err(driver)?;
        self.wifi.start().map_err(driver)?;
        self.wifi.connect().map_err(driver)?;
        self.wifi.wait_netif_up().map_err(driver)
    }

    #[cfg(not(target_os = "espidf"))]
    fn join(&mut self, _creds: &Credentials) -> Result<(), JoinError> {
        self.sim_up = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn link_up(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn link_up(&self) -> bool {
        self.sim_up
    }

    /// Station address while the link is up.
    #[cfg(target_os = "espidf")]
    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.wifi.wifi().sta_netif().get_ip_info().ok().map(|i| i.ip)
    }

    /// Station address while the link is up.
    #[cfg(not(target_os = "espidf"))]
    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.is_connected().then_some(Ipv4Addr::LOCALHOST)
    }

    /// Simulate the AP going away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_up = false;
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}
