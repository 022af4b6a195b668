pub mod assets;
pub mod error;
pub mod holder;
pub mod observable;
pub mod snapshot;
pub mod store;

pub use assets::{SOURCE_IMAGE_COUNT, TEXTS, source_image};
pub use error::{Result, StateError};
pub use holder::{StateHolder, StateHolderConfig};
pub use observable::Observable;
pub use snapshot::{SavedImageRef, SavedState};
pub use store::ImageStore;
