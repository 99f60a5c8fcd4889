use std::fmt;
use std::mem;

use bitflags::bitflags;
use byteorder::{ByteOrder, NativeEndian};
use libc::{c_int, c_uint, IFF_MULTI_QUEUE, IFF_NO_PI, IFF_TAP, IFF_TUN, IFNAMSIZ};
use nix::request_code_write;
use nix::sys::ioctl::ioctl_num_type;

use crate::configuration::DeviceType;

/// TUN driver control requests issued against a `/dev/net/tun` descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Request {
    /// `TUNSETIFF`, takes an [`IfReq`] by reference and rewrites its name.
    SetIff,
    /// `TUNSETPERSIST`, takes `0` or `1` by value.
    SetPersist,
    /// `TUNSETOWNER`, takes a uid by value.
    SetOwner,
    /// `TUNSETGROUP`, takes a gid by value.
    SetGroup,
    /// `TUNSETOFFLOAD`, takes an [`Offload`] mask by value.
    SetOffload,
    /// `TUNSETVNETHDRSZ`, takes an `int` by reference.
    SetVnetHdrSz,
}

impl Request {
    /// The `_IOW('T', nr, int)` number for the current architecture.
    pub fn code(self) -> ioctl_num_type {
        let size = mem::size_of::<c_int>();
        match self {
            Request::SetIff => request_code_write!(b'T', 202, size),
            Request::SetPersist => request_code_write!(b'T', 203, size),
            Request::SetOwner => request_code_write!(b'T', 204, size),
            Request::SetGroup => request_code_write!(b'T', 206, size),
            Request::SetOffload => request_code_write!(b'T', 208, mem::size_of::<c_uint>()),
            Request::SetVnetHdrSz => request_code_write!(b'T', 216, size),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Request::SetIff => "TUNSETIFF",
            Request::SetPersist => "TUNSETPERSIST",
            Request::SetOwner => "TUNSETOWNER",
            Request::SetGroup => "TUNSETGROUP",
            Request::SetOffload => "TUNSETOFFLOAD",
            Request::SetVnetHdrSz => "TUNSETVNETHDRSZ",
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// `ifr_flags` accepted by `TUNSETIFF`.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterfaceFlags: u16 {
        const TUN = IFF_TUN as u16;
        const TAP = IFF_TAP as u16;
        const MULTI_QUEUE = IFF_MULTI_QUEUE as u16;
        const NO_PI = IFF_NO_PI as u16;
    }
}

impl From<DeviceType> for InterfaceFlags {
    fn from(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Tun => InterfaceFlags::TUN,
            DeviceType::Tap => InterfaceFlags::TAP,
        }
    }
}

bitflags! {
    /// `TUN_F_*` bits for `TUNSETOFFLOAD`. `0x10` is `TUN_F_UFO` and never requested.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Offload: c_uint {
        const CSUM = 0x01;
        const TSO4 = 0x02;
        const TSO6 = 0x04;
        const TSO_ECN = 0x08;
        const USO4 = 0x20;
        const USO6 = 0x40;
    }
}

/// Size of the request buffer handed to `TUNSETIFF`.
pub const IFREQ_SIZE: usize = 0x28;
/// Bytes reserved for the interface name, not necessarily NUL terminated.
pub const NAME_LEN: usize = IFNAMSIZ;
const NAME_OFFSET: usize = 0x00;
const FLAGS_OFFSET: usize = 0x10;
const FLAGS_LEN: usize = mem::size_of::<u16>();

/// The `struct ifreq` passed to `TUNSETIFF`, as raw bytes.
///
/// | offset | size | field |
/// |--------|------|-------|
/// | 0x00 | 16 | name, zero padded |
/// | 0x10 | 2 | flags, host byte order |
/// | 0x12 | 22 | zero |
#[repr(C)]
#[derive(Clone, PartialEq, Eq)]
pub struct IfReq {
    bytes: [u8; IFREQ_SIZE],
}

const _: () = assert!(mem::size_of::<IfReq>() == IFREQ_SIZE);
const _: () = assert!(FLAGS_OFFSET == NAME_OFFSET + NAME_LEN);

impl IfReq {
    /// Build a request for `name` with `flags`. Only the first [`NAME_LEN`]
    /// bytes of `name` are kept.
    pub fn new(name: &str, flags: InterfaceFlags) -> Self {
        let mut bytes = [0u8; IFREQ_SIZE];
        let name = name.as_bytes();
        let len = name.len().min(NAME_LEN);
        bytes[NAME_OFFSET..NAME_OFFSET + len].copy_from_slice(&name[..len]);
        NativeEndian::write_u16(&mut bytes[FLAGS_OFFSET..FLAGS_OFFSET + FLAGS_LEN], flags.bits());
        IfReq { bytes }
    }

    /// The name field with trailing zero bytes removed.
    pub fn name(&self) -> String {
        let field = &self.bytes[NAME_OFFSET..NAME_OFFSET + NAME_LEN];
        let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        String::from_utf8_lossy(&field[..end]).into_owned()
    }

    pub fn flags(&self) -> InterfaceFlags {
        InterfaceFlags::from_bits_retain(NativeEndian::read_u16(
            &self.bytes[FLAGS_OFFSET..FLAGS_OFFSET + FLAGS_LEN],
        ))
    }

    pub fn as_bytes(&self) -> &[u8; IFREQ_SIZE] {
        &self.bytes
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut IfReq {
        self as *mut IfReq
    }
}

impl fmt::Debug for IfReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IfReq")
            .field("name", &self.name())
            .field("flags", &self.flags())
            .finish()
    }
}
