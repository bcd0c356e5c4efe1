pub mod sync;
pub mod transform;
