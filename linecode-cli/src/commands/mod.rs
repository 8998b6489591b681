pub mod batch;
pub mod encode;
pub mod frame;
pub mod simulate;
