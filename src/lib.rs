/*!
Configure a Linux TUN/TAP device through an already-open `/dev/net/tun` descriptor.

The caller opens (and later closes) the control node; this crate issues
`TUNSETIFF` followed by the ownership, virtio header, offload and persistence
requests described by a [`Config`], and hands back the interface name the
kernel settled on.

# Example:
```no_run
use std::fs::OpenOptions;
use tun_setup::{setup_fd, Config, DeviceType};

let file = OpenOptions::new().read(true).write(true).open("/dev/net/tun")?;
let mut config = Config::default();
config
    .device_type(DeviceType::Tap)
    .name("mytap0")
    .platform_config(|p| {
        p.multi_queue(true).tso4(true);
    })
    .persist(true);
let name = setup_fd(&config, &file)?;
println!("created {name}");
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

#![cfg_attr(docsrs, feature(doc_cfg))]

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "android"))] {
        mod configuration;
        mod error;
        pub mod platform;

        pub use crate::configuration::*;
        pub use crate::error::{Error, Result};
        pub use crate::platform::{
            setup, setup_fd, setup_raw_fd, Arg, IfReq, InterfaceFlags, Offload,
            PlatformSpecificParams, Request, TunControl,
        };
    }
}
