//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                 |
//! |----------------|--------------|-----------------------------|
//! | `json_store`   | RecordStore  | JSON file on disk           |
//! | `log_sink`     | EventSink    | `log` output                |
//! | `memory_store` | RecordStore  | in-process `Vec`            |
//! | `rpi`          | GpioPort     | Raspberry Pi GPIO (rppal)   |
//! | `sim_gpio`     | GpioPort     | simulated pins              |
//! | `time`         | Clock        | system clock / fixed value  |

pub mod json_store;
pub mod log_sink;
pub mod memory_store;
#[cfg(all(feature = "rpi", target_os = "linux"))]
pub mod rpi;
pub mod sim_gpio;
pub mod time;
