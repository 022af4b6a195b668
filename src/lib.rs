pub mod session;

pub use session::{
    ImageStore, Observable, Result, SOURCE_IMAGE_COUNT, SavedImageRef, SavedState, StateError,
    StateHolder, StateHolderConfig, TEXTS, source_image,
};
