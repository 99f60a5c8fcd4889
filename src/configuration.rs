use libc::{gid_t, uid_t};

use crate::platform::PlatformSpecificParams;

/// Kind of virtual interface to create.
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq)]
pub enum DeviceType {
    /// Layer 3, raw IP packets.
    #[default]
    Tun,
    /// Layer 2, Ethernet frames.
    Tap,
}

/// Owner and group handed to `TUNSETOWNER` / `TUNSETGROUP`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Permissions {
    pub owner: uid_t,
    pub group: gid_t,
}

/// Configuration record for a TUN/TAP interface.
#[derive(Clone, Default, Debug)]
pub struct Config {
    pub(crate) device_type: DeviceType,
    pub(crate) name: String,
    pub(crate) permissions: Option<Permissions>,
    pub(crate) platform_config: PlatformSpecificParams,
    pub(crate) persist: bool,
}

impl Config {
    /// Access the platform-dependent configuration.
    pub fn platform_config<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut PlatformSpecificParams),
    {
        f(&mut self.platform_config);
        self
    }

    /// Set the device type.
    pub fn device_type(&mut self, value: DeviceType) -> &mut Self {
        self.device_type = value;
        self
    }

    /// Set the interface name. An empty name lets the kernel pick one
    /// (`tun0`, `tap1`, ...).
    ///
    /// [Note: the name is copied into a 16 byte field; longer names are cut
    /// to their first 16 bytes and the kernel then applies its own limit of
    /// 15 characters. No error is reported for this. -- end note]
    pub fn name<S: AsRef<str>>(&mut self, tun_name: S) -> &mut Self {
        self.name = tun_name.as_ref().into();
        self
    }

    /// Change the owner and group of the device node.
    pub fn permissions(&mut self, owner: uid_t, group: gid_t) -> &mut Self {
        self.permissions = Some(Permissions { owner, group });
        self
    }

    /// Keep the interface around after the descriptor is closed.
    pub fn persist(&mut self, value: bool) -> &mut Self {
        self.persist = value;
        self
    }
}
