mod loopback;

pub use loopback::{LoopbackConnection, LoopbackConnectionFactory, ANONYMOUS_PRINCIPAL};
