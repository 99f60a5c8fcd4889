use std::os::fd::{AsFd, BorrowedFd, RawFd};

use libc::c_int;

use crate::configuration::{Config, Permissions};
use crate::error::Result;
use crate::platform::linux::control::{control, Arg, TunControl};
use crate::platform::linux::sys::{IfReq, InterfaceFlags, Request, NAME_LEN};

/// Configure the TUN/TAP device behind `fd` and return the interface name.
///
/// `fd` must refer to an open `/dev/net/tun` descriptor that has not been
/// attached to an interface yet. It is only borrowed; closing it is up to
/// the caller, as is removing a half configured interface after an error.
pub fn setup_fd<Fd: AsFd>(config: &Config, fd: Fd) -> Result<String> {
    setup(&mut fd.as_fd(), config)
}

/// # Safety
/// The fd passed in must be open for the duration of the call.
pub unsafe fn setup_raw_fd(config: &Config, fd: RawFd) -> Result<String> {
    setup_fd(config, BorrowedFd::borrow_raw(fd))
}

/// Create the interface, then apply the remaining options, stopping at the
/// first request the kernel rejects.
pub fn setup<C: TunControl + ?Sized>(ctl: &mut C, config: &Config) -> Result<String> {
    let name = create_interface(ctl, &config.name, interface_flags(config))?;
    set_device_options(ctl, config)?;
    Ok(name)
}

fn interface_flags(config: &Config) -> InterfaceFlags {
    let mut flags = InterfaceFlags::from(config.device_type) | InterfaceFlags::NO_PI;
    flags.set(
        InterfaceFlags::MULTI_QUEUE,
        config.platform_config.multi_queue,
    );
    flags
}

fn create_interface<C: TunControl + ?Sized>(
    ctl: &mut C,
    name: &str,
    flags: InterfaceFlags,
) -> Result<String> {
    if name.len() >= NAME_LEN {
        log::warn!("interface name {name:?} does not fit in {NAME_LEN} bytes, truncating");
    }
    let mut req = IfReq::new(name, flags);
    control(ctl, Request::SetIff, Arg::IfReq(&mut req))?;
    let name = req.name();
    log::debug!("attached to interface {name} ({flags:?})");
    Ok(name)
}

fn set_device_options<C: TunControl + ?Sized>(ctl: &mut C, config: &Config) -> Result<()> {
    if let Some(Permissions { owner, group }) = config.permissions {
        control(ctl, Request::SetOwner, Arg::Value(owner.into()))?;
        control(ctl, Request::SetGroup, Arg::Value(group.into()))?;
    }

    let params = &config.platform_config;
    if params.vnet_hdr_size != 0 {
        let size = c_int::from(params.vnet_hdr_size);
        control(ctl, Request::SetVnetHdrSz, Arg::IntRef(&size))?;
    }

    let offload = params.offload();
    if !offload.is_empty() {
        control(ctl, Request::SetOffload, Arg::Value(offload.bits().into()))?;
    }

    // Last, so a failure above never leaves the interface persistent.
    control(ctl, Request::SetPersist, Arg::Value(config.persist.into()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::configuration::DeviceType;
    use crate::error::Error;
    use nix::errno::Errno;

    /// Records every request and answers `TUNSETIFF` like the kernel would.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Request, u64)>,
        submitted: Option<IfReq>,
        assign: Option<&'static str>,
        fail: Option<(Request, Errno)>,
    }

    impl Recorder {
        fn assigning(name: &'static str) -> Self {
            Recorder {
                assign: Some(name),
                ..Default::default()
            }
        }
        fn failing(request: Request, errno: Errno) -> Self {
            Recorder {
                fail: Some((request, errno)),
                ..Default::default()
            }
        }
        fn requests(&self) -> Vec<Request> {
            self.calls.iter().map(|(r, _)| *r).collect()
        }
        fn value_of(&self, request: Request) -> Option<u64> {
            self.calls
                .iter()
                .find(|(r, _)| *r == request)
                .map(|(_, v)| *v)
        }
    }

    impl TunControl for Recorder {
        fn ioctl(&mut self, request: Request, arg: &mut Arg<'_>) -> Result<(), Errno> {
            let value = match *arg {
                Arg::Value(v) => v as u64,
                Arg::IntRef(v) => *v as u64,
                Arg::IfReq(ref req) => {
                    self.submitted = Some((**req).clone());
                    u64::from(req.flags().bits())
                }
            };
            self.calls.push((request, value));
            if let Some((failing, errno)) = self.fail {
                if failing == request {
                    return Err(errno);
                }
            }
            if let (Some(assigned), Arg::IfReq(req)) = (self.assign, &mut *arg) {
                let flags = req.flags();
                **req = IfReq::new(assigned, flags);
            }
            Ok(())
        }
    }

    fn full_config() -> Config {
        let mut config = Config::default();
        config
            .device_type(DeviceType::Tap)
            .name("full0")
            .permissions(1000, 1001)
            .platform_config(|p| {
                p.vnet_hdr_size(12).csum(true).tso4(true);
            })
            .persist(true);
        config
    }

    #[test]
    fn tun_with_kernel_assigned_name() {
        let mut ctl = Recorder::assigning("tun0");
        let name = setup(&mut ctl, &Config::default()).unwrap();

        assert_eq!(name, "tun0");
        assert_eq!(
            ctl.calls,
            vec![(Request::SetIff, 0x1001), (Request::SetPersist, 0)]
        );
        let submitted = ctl.submitted.unwrap();
        assert!(submitted.as_bytes()[..16].iter().all(|&b| b == 0));
    }

    #[test]
    fn multi_queue_tap_with_offload_and_persist() {
        let mut config = Config::default();
        config
            .device_type(DeviceType::Tap)
            .name("mytap0")
            .platform_config(|p| {
                p.multi_queue(true).tso4(true);
            })
            .persist(true);
        let mut ctl = Recorder::default();
        let name = setup(&mut ctl, &config).unwrap();

        assert_eq!(name, "mytap0");
        assert_eq!(
            ctl.calls,
            vec![
                (Request::SetIff, 0x1102),
                (Request::SetOffload, 2),
                (Request::SetPersist, 1),
            ]
        );
        let submitted = ctl.submitted.unwrap();
        let mut field = [0u8; 16];
        field[..6].copy_from_slice(b"mytap0");
        assert_eq!(&submitted.as_bytes()[..16], &field);
    }

    #[test]
    fn creation_flags() {
        for device_type in [DeviceType::Tun, DeviceType::Tap] {
            for multi_queue in [false, true] {
                let mut config = Config::default();
                config.device_type(device_type).platform_config(|p| {
                    p.multi_queue(multi_queue);
                });
                let flags = interface_flags(&config);

                assert!(flags.contains(InterfaceFlags::TUN) ^ flags.contains(InterfaceFlags::TAP));
                assert_eq!(
                    flags.contains(InterfaceFlags::TAP),
                    device_type == DeviceType::Tap
                );
                assert!(flags.contains(InterfaceFlags::NO_PI));
                assert_eq!(flags.contains(InterfaceFlags::MULTI_QUEUE), multi_queue);
            }
        }
    }

    #[test]
    fn offload_issued_only_when_mask_non_zero() {
        for bits in 0u8..64 {
            let on = |i: u8| bits & (1 << i) != 0;
            let mut config = Config::default();
            config.platform_config(|p| {
                p.csum(on(0))
                    .tso4(on(1))
                    .tso6(on(2))
                    .tso_ecn(on(3))
                    .uso4(on(4))
                    .uso6(on(5));
            });
            let mut ctl = Recorder::default();
            setup(&mut ctl, &config).unwrap();

            let expected = u64::from(config.platform_config.offload().bits());
            match ctl.value_of(Request::SetOffload) {
                Some(mask) => {
                    assert_ne!(bits, 0);
                    assert_eq!(mask, expected);
                }
                None => assert_eq!(bits, 0),
            }
            assert_eq!(ctl.requests().last(), Some(&Request::SetPersist));
        }
    }

    #[test]
    fn full_sequence_order() {
        let mut ctl = Recorder::default();
        setup(&mut ctl, &full_config()).unwrap();
        assert_eq!(
            ctl.calls,
            vec![
                (Request::SetIff, 0x1002),
                (Request::SetOwner, 1000),
                (Request::SetGroup, 1001),
                (Request::SetVnetHdrSz, 12),
                (Request::SetOffload, 3),
                (Request::SetPersist, 1),
            ]
        );
    }

    #[test]
    fn persist_false_still_issued() {
        let mut config = full_config();
        config.persist(false);
        let mut ctl = Recorder::default();
        setup(&mut ctl, &config).unwrap();
        assert_eq!(ctl.calls.last(), Some(&(Request::SetPersist, 0)));
    }

    #[test]
    fn creation_failure_stops_everything() {
        let mut ctl = Recorder::failing(Request::SetIff, Errno::EBUSY);
        let err = setup(&mut ctl, &full_config()).unwrap_err();

        assert_eq!(ctl.requests(), vec![Request::SetIff]);
        let Error::Ioctl {
            request,
            arg,
            source,
        } = err;
        assert_eq!(request, Request::SetIff);
        assert_eq!(arg, "full0");
        assert_eq!(source, Errno::EBUSY);
    }

    #[test]
    fn option_failure_stops_later_requests() {
        let order = [
            Request::SetIff,
            Request::SetOwner,
            Request::SetGroup,
            Request::SetVnetHdrSz,
            Request::SetOffload,
            Request::SetPersist,
        ];
        for (i, failing) in order.iter().copied().enumerate().skip(1) {
            let mut ctl = Recorder::failing(failing, Errno::EINVAL);
            let err = setup(&mut ctl, &full_config()).unwrap_err();

            assert_eq!(err.request(), failing);
            assert_eq!(err.errno(), Errno::EINVAL);
            assert_eq!(ctl.requests(), &order[..=i]);
        }
    }

    #[test]
    fn failure_describes_argument() {
        let mut ctl = Recorder::failing(Request::SetGroup, Errno::EPERM);
        let err = setup(&mut ctl, &full_config()).unwrap_err();
        assert!(err.to_string().starts_with("ioctl(fd, TUNSETGROUP, 1001): "));
    }

    #[test]
    fn long_name_is_truncated_not_rejected() {
        let mut config = Config::default();
        config.name("a-very-long-interface-name");
        let mut ctl = Recorder::default();
        let name = setup(&mut ctl, &config).unwrap();
        assert_eq!(name, "a-very-long-inte");
    }
}
