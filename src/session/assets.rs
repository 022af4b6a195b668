use image::{DynamicImage, Rgb, RgbImage};

/// The fixed text values the randomize action picks from.
pub const TEXTS: [&str; 3] = ["Hello World", "HaHaHa", "Blah Blah Blah"];

pub const SOURCE_IMAGE_COUNT: usize = 3;

const IMAGE_WIDTH: u32 = 96;
const IMAGE_HEIGHT: u32 = 64;

/// Deterministic stand-ins for the three bundled drawables. The same index
/// always yields the same pixels, so restored images can be matched against
/// their source.
pub fn source_image(index: usize) -> DynamicImage {
    match index % SOURCE_IMAGE_COUNT {
        0 => stripes(),
        1 => checkerboard(),
        _ => gradient(),
    }
}

fn stripes() -> DynamicImage {
    let colours = [
        Rgb([190, 30, 45]),
        Rgb([247, 148, 29]),
        Rgb([0, 104, 55]),
        Rgb([46, 49, 146]),
    ];
    let band = (IMAGE_HEIGHT as usize / colours.len()).max(1);
    let mut img = RgbImage::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    for (_, y, pixel) in img.enumerate_pixels_mut() {
        let index = ((y as usize) / band).min(colours.len() - 1);
        *pixel = colours[index];
    }
    DynamicImage::ImageRgb8(img)
}

fn checkerboard() -> DynamicImage {
    let light = Rgb([236, 229, 206]);
    let dark = Rgb([60, 42, 33]);
    let cell = 8;
    let mut img = RgbImage::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = if (x / cell + y / cell) % 2 == 0 {
            light
        } else {
            dark
        };
    }
    DynamicImage::ImageRgb8(img)
}

fn gradient() -> DynamicImage {
    let mut img = RgbImage::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = (x * 255 / (IMAGE_WIDTH - 1)) as u8;
        let g = (y * 255 / (IMAGE_HEIGHT - 1)) as u8;
        *pixel = Rgb([r, g, 96]);
    }
    DynamicImage::ImageRgb8(img)
}
