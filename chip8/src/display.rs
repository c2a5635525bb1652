use emu8::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use emu8::FrameBuffer;

/// Size multiplier for each Chip-8 pixel in the window
#[cfg_attr(not(feature = "sdl"), allow(dead_code))]
pub const SCALE: usize = 10;

/// Renders a FrameBuffer as text, one line per row: `#` lit, `.` dark
pub fn frame_to_text(frame: &FrameBuffer) -> String {
    let mut text = String::with_capacity((DISPLAY_WIDTH + 1) * DISPLAY_HEIGHT);
    for row in frame.iter() {
        text.extend(row.iter().map(|&p| if p == 1 { '#' } else { '.' }));
        text.push('\n');
    }
    text
}

/// Formats a Chip-8 FrameBuffer as RGB24 pixel data.
///
/// - Flattening the 2D frame buffer into a 1D array by concatenating its rows
/// - Triplicating each element to represent the RGB values of each pixel
/// - Multiplying each value by 255 to convert from a binary state to 0-255 intensity
#[cfg_attr(not(feature = "sdl"), allow(dead_code))]
pub fn frame_to_rgb24(frame: &FrameBuffer) -> Vec<u8> {
    frame
        .iter()
        .flat_map(|row| row.iter())
        .flat_map(|p| std::iter::repeat(p).take(3))
        .map(|p| p * 255)
        .collect()
}

#[cfg(feature = "sdl")]
pub use window::Display;

#[cfg(feature = "sdl")]
mod window {
    use anyhow::{Error, Result};
    use log::info;
    use sdl2::pixels::PixelFormatEnum;

    use super::{frame_to_rgb24, DISPLAY_HEIGHT, DISPLAY_WIDTH, SCALE};
    use emu8::FrameBuffer;

    /// # Display
    /// The Chip-8 display is 64x32 black/white pixels, scaled up into an SDL2 window.
    /// It only gets a call to `render` when the Chip-8 FrameBuffer is updated.
    pub struct Display {
        canvas: sdl2::render::WindowCanvas,
    }

    impl Display {
        /// Creates a window bound to an sdl2 context
        pub fn new(sdl: &sdl2::Sdl) -> Result<Self> {
            let (width, height) = (DISPLAY_WIDTH * SCALE, DISPLAY_HEIGHT * SCALE);
            info!("Window size: {}x{}", width, height);
            info!("Screen size: {}x{}", DISPLAY_WIDTH, DISPLAY_HEIGHT);
            info!("Pixel size:  {}x{}", SCALE, SCALE);

            let video_subsystem = sdl.video().map_err(Error::msg)?;
            let window = video_subsystem
                .window("CHIP-8", width as u32, height as u32)
                .position_centered()
                .allow_highdpi()
                .build()?;
            let canvas = window.into_canvas().present_vsync().build()?;

            Ok(Display { canvas })
        }

        /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
        pub fn render(&mut self, frame: &FrameBuffer) -> Result<()> {
            let texture_creator = self.canvas.texture_creator();

            let mut texture = texture_creator.create_texture_streaming(
                PixelFormatEnum::RGB24,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )?;

            let pixels = frame_to_rgb24(frame);
            texture
                .with_lock(None, |buffer: &mut [u8], _pitch: usize| {
                    buffer[..pixels.len()].copy_from_slice(&pixels);
                })
                .map_err(Error::msg)?;

            self.canvas.copy(&texture, None, None).map_err(Error::msg)?;
            self.canvas.present();
            Ok(())
        }
    }
}
