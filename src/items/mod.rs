//! Typed entities shared between documents.

pub mod brditems;
pub mod common;
pub mod dimensions;
pub mod gritems;
pub mod schitems;
pub mod syitems;
pub mod zones;
