pub mod channel_discovery;
pub mod fanout;
pub mod volume;
