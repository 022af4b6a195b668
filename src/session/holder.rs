use std::env;
use std::path::PathBuf;

use image::DynamicImage;
use rand::Rng;
use tracing::{info, warn};

use super::assets::{self, SOURCE_IMAGE_COUNT, TEXTS};
use super::observable::Observable;
use super::snapshot::{SavedImageRef, SavedState};
use super::store::ImageStore;

/// Construction-time options for a [`StateHolder`].
#[derive(Clone, Debug)]
pub struct StateHolderConfig {
    /// When false, snapshots come back empty and restoration hints are
    /// ignored; the session behaves as if the host forgot everything on
    /// recreation.
    pub persist_across_recreation: bool,
    /// App-private cache directory the image side channel writes into.
    pub cache_dir: PathBuf,
}

impl Default for StateHolderConfig {
    fn default() -> Self {
        Self {
            persist_across_recreation: true,
            cache_dir: env::temp_dir().join("keepsake"),
        }
    }
}

/// Owns the screen session's two mutable fields and carries them across
/// host-driven destroy/recreate cycles.
///
/// The host adapter drives the lifecycle explicitly: it passes a prior
/// [`SavedState`] at construction and calls [`on_snapshot_requested`] when
/// it wants a new one. All calls happen on the host's event loop thread.
///
/// [`on_snapshot_requested`]: StateHolder::on_snapshot_requested
pub struct StateHolder {
    config: StateHolderConfig,
    store: ImageStore,
    text: Observable<String>,
    image: Observable<Option<DynamicImage>>,
}

impl StateHolder {
    /// Build a holder, optionally from a prior snapshot. A restoration hint
    /// eagerly materializes the image, consuming the temp file behind its
    /// ref; a hint that fails to load leaves the image absent rather than
    /// erroring.
    pub fn new(config: StateHolderConfig, restored: Option<&SavedState>) -> Self {
        let store = ImageStore::new(config.cache_dir.clone());

        let (text, image) = match restored {
            Some(saved) if config.persist_across_recreation => {
                let image = store.restore(&saved.image);
                info!(
                    text = saved.text.as_str(),
                    image_recovered = image.is_some(),
                    "Restored session state"
                );
                (saved.text.clone(), image)
            }
            _ => (String::new(), None),
        };

        Self {
            config,
            store,
            text: Observable::new(text),
            image: Observable::new(image),
        }
    }

    pub fn text(&self) -> &str {
        self.text.get()
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.get().as_ref()
    }

    pub fn observe_text(&mut self, observer: impl FnMut(&String) + 'static) {
        self.text.observe(observer);
    }

    pub fn observe_image(&mut self, observer: impl FnMut(&Option<DynamicImage>) + 'static) {
        self.image.observe(observer);
    }

    /// The "button click": replace both fields with uniform random picks
    /// from the fixed sets. Observers of both fields fire.
    pub fn randomize(&mut self) {
        let mut rng = rand::rng();
        let text = TEXTS[rng.random_range(0..TEXTS.len())];
        let index = rng.random_range(0..SOURCE_IMAGE_COUNT);

        self.text.set(text.to_string());
        self.image.set(Some(assets::source_image(index)));
    }

    /// Explicit snapshot hook for the owning host adapter. The image goes
    /// to a temp file and only its path enters the record; a write failure
    /// degrades to an empty image ref instead of failing the snapshot.
    pub fn on_snapshot_requested(&self) -> SavedState {
        if !self.config.persist_across_recreation {
            return SavedState::default();
        }

        let image = match self.image.get() {
            Some(image) => match self.store.save(image) {
                Ok(saved) => saved,
                Err(err) => {
                    warn!(error = %err, "Failed writing image snapshot");
                    SavedImageRef::empty()
                }
            },
            None => SavedImageRef::empty(),
        };

        SavedState {
            text: self.text.get().clone(),
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::{TempDir, tempdir};

    fn test_config(dir: &TempDir) -> StateHolderConfig {
        StateHolderConfig {
            persist_across_recreation: true,
            cache_dir: dir.path().to_path_buf(),
        }
    }

    fn same_pixels(a: &DynamicImage, b: &DynamicImage) -> bool {
        a.to_rgb8().as_raw() == b.to_rgb8().as_raw()
    }

    fn matches_a_source_image(image: &DynamicImage) -> bool {
        (0..SOURCE_IMAGE_COUNT).any(|index| same_pixels(image, &assets::source_image(index)))
    }

    #[test]
    fn fresh_holder_starts_empty() {
        let dir = tempdir().unwrap();
        let holder = StateHolder::new(test_config(&dir), None);

        assert_eq!(holder.text(), "");
        assert!(holder.image().is_none());
    }

    #[test]
    fn randomize_only_picks_from_the_fixed_sets() {
        let dir = tempdir().unwrap();
        let mut holder = StateHolder::new(test_config(&dir), None);

        for _ in 0..20 {
            holder.randomize();
            assert!(TEXTS.contains(&holder.text()));
            assert!(matches_a_source_image(holder.image().unwrap()));
        }
    }

    #[test]
    fn observers_fire_on_every_randomize() {
        let dir = tempdir().unwrap();
        let mut holder = StateHolder::new(test_config(&dir), None);

        let texts = Rc::new(RefCell::new(0u32));
        let images = Rc::new(RefCell::new(0u32));
        let sink = texts.clone();
        holder.observe_text(move |_| *sink.borrow_mut() += 1);
        let sink = images.clone();
        holder.observe_image(move |_| *sink.borrow_mut() += 1);

        holder.randomize();
        holder.randomize();

        assert_eq!(*texts.borrow(), 2);
        assert_eq!(*images.borrow(), 2);
    }

    #[test]
    fn snapshot_of_empty_holder_has_no_image_ref() {
        let dir = tempdir().unwrap();
        let holder = StateHolder::new(test_config(&dir), None);

        let snapshot = holder.on_snapshot_requested();
        assert_eq!(snapshot.text, "");
        assert!(snapshot.image.is_empty());
    }

    #[test]
    fn state_survives_a_destroy_recreate_cycle() {
        let dir = tempdir().unwrap();

        let mut first = StateHolder::new(test_config(&dir), None);
        first.randomize();
        let text = first.text().to_string();
        let image = first.image().unwrap().clone();

        let snapshot = first.on_snapshot_requested();
        let path = snapshot.image.filename.clone().unwrap();
        assert!(path.exists());
        drop(first);

        let second = StateHolder::new(test_config(&dir), Some(&snapshot));
        assert_eq!(second.text(), text);
        assert!(same_pixels(second.image().unwrap(), &image));
        assert!(!path.exists(), "restoration must consume the temp file");
    }

    #[test]
    fn repeated_snapshots_leave_earlier_files_alone() {
        let dir = tempdir().unwrap();
        let mut holder = StateHolder::new(test_config(&dir), None);
        holder.randomize();

        let first = holder.on_snapshot_requested();
        let second = holder.on_snapshot_requested();

        let first_path = first.image.filename.unwrap();
        let second_path = second.image.filename.unwrap();
        assert_ne!(first_path, second_path);
        assert!(first_path.exists());
        assert!(second_path.exists());
    }

    #[test]
    fn hint_with_missing_file_degrades_to_absent_image() {
        let dir = tempdir().unwrap();
        let snapshot = SavedState {
            text: "Hello World".to_string(),
            image: SavedImageRef {
                filename: Some(dir.path().join("gone.png")),
            },
        };

        let holder = StateHolder::new(test_config(&dir), Some(&snapshot));
        assert_eq!(holder.text(), "Hello World");
        assert!(holder.image().is_none());
    }

    #[test]
    fn persistence_toggle_off_ignores_hint_and_snapshots_nothing() {
        let dir = tempdir().unwrap();
        let config = StateHolderConfig {
            persist_across_recreation: false,
            cache_dir: dir.path().to_path_buf(),
        };

        let mut first = StateHolder::new(config.clone(), None);
        first.randomize();
        let snapshot = first.on_snapshot_requested();
        assert_eq!(snapshot, SavedState::default());

        // A hint from elsewhere is ignored on construction too.
        let second = StateHolder::new(
            config,
            Some(&SavedState {
                text: "HaHaHa".to_string(),
                image: SavedImageRef::empty(),
            }),
        );
        assert_eq!(second.text(), "");
        assert!(second.image().is_none());
    }

    #[test]
    fn snapshot_with_unusable_cache_dir_degrades_to_empty_ref() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"").unwrap();

        let config = StateHolderConfig {
            persist_across_recreation: true,
            cache_dir: blocker,
        };
        let mut holder = StateHolder::new(config, None);
        holder.randomize();

        let snapshot = holder.on_snapshot_requested();
        assert!(TEXTS.contains(&snapshot.text.as_str()));
        assert!(snapshot.image.is_empty());
    }
}
