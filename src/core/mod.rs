pub mod analysis;
pub mod collector;
pub mod etl;
pub mod import;
pub mod pipeline;
pub mod preprocess;
pub mod tables;
pub mod view;

pub use crate::domain::model::{RawPost, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
