pub mod sys;

mod control;
mod device;

pub use self::control::{Arg, TunControl};
pub use self::device::{setup, setup_fd, setup_raw_fd};
pub use self::sys::{IfReq, InterfaceFlags, Offload, Request};

/// Linux-only interface configuration.
#[derive(Copy, Clone, Default, Debug)]
pub struct PlatformSpecificParams {
    /// Open the interface with `IFF_MULTI_QUEUE`.
    pub(crate) multi_queue: bool,
    /// Size of the virtio-net header, `0` leaves the kernel default.
    pub(crate) vnet_hdr_size: u16,
    pub(crate) csum: bool,
    pub(crate) tso4: bool,
    pub(crate) tso6: bool,
    pub(crate) tso_ecn: bool,
    pub(crate) uso4: bool,
    pub(crate) uso6: bool,
}

impl PlatformSpecificParams {
    /// Enable multi queue support, each further `TUNSETIFF` on a new
    /// descriptor with the same name attaches another queue.
    pub fn multi_queue(&mut self, value: bool) -> &mut Self {
        self.multi_queue = value;
        self
    }
    /// Set the virtio-net header size through `TUNSETVNETHDRSZ`.
    pub fn vnet_hdr_size(&mut self, value: u16) -> &mut Self {
        self.vnet_hdr_size = value;
        self
    }
    /// Userspace accepts packets with partial checksums.
    pub fn csum(&mut self, value: bool) -> &mut Self {
        self.csum = value;
        self
    }
    pub fn tso4(&mut self, value: bool) -> &mut Self {
        self.tso4 = value;
        self
    }
    pub fn tso6(&mut self, value: bool) -> &mut Self {
        self.tso6 = value;
        self
    }
    pub fn tso_ecn(&mut self, value: bool) -> &mut Self {
        self.tso_ecn = value;
        self
    }
    pub fn uso4(&mut self, value: bool) -> &mut Self {
        self.uso4 = value;
        self
    }
    pub fn uso6(&mut self, value: bool) -> &mut Self {
        self.uso6 = value;
        self
    }

    /// Offload mask for `TUNSETOFFLOAD`.
    pub fn offload(&self) -> Offload {
        let mut offload = Offload::empty();
        offload.set(Offload::CSUM, self.csum);
        offload.set(Offload::TSO4, self.tso4);
        offload.set(Offload::TSO6, self.tso6);
        offload.set(Offload::TSO_ECN, self.tso_ecn);
        offload.set(Offload::USO4, self.uso4);
        offload.set(Offload::USO6, self.uso6);
        offload
    }
}
