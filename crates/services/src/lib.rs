//! Local services for the art lens: image normalization before upload
//! and the on-disk settings store.

pub mod image_normalizer;
pub mod settings_store;
