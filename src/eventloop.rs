use log::{info, warn};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::render::{Canvas, Texture};
use sdl2::video::Window;

use crate::joypad::Button;
use crate::nes::{FrameStatus, Nes};
use crate::screen_buffer::{SCREEN_HEIGHT, SCREEN_WIDTH};

const CLEAR_COLOR: Color = Color::RGB(0, 0, 0);

/// Keyboard layout for controller 1
pub fn button_for_key(keycode: Keycode) -> Option<Button> {
    match keycode {
        Keycode::X => Some(Button::A),
        Keycode::Z => Some(Button::B),
        Keycode::RShift | Keycode::Backspace => Some(Button::Select),
        Keycode::Return => Some(Button::Start),
        Keycode::Up => Some(Button::Up),
        Keycode::Down => Some(Button::Down),
        Keycode::Left => Some(Button::Left),
        Keycode::Right => Some(Button::Right),
        _ => None,
    }
}

/// EventLoop owns the SDL window and drives a `Nes` at its native frame rate.
///
/// Escape or closing the window quits, F5 presses the reset button.
pub struct EventLoop {
    sdl_context: sdl2::Sdl,
    canvas: Canvas<Window>,
    event_pump: sdl2::EventPump,
    timing_scale: f64,
}

impl EventLoop {
    const MIN_SCALE: f32 = 1.0;
    const MAX_SCALE: f32 = 5.0;
    const MIN_TIMING_SCALE: f64 = 0.001;
    const MAX_TIMING_SCALE: f64 = 100.0;

    /// Open a window of `video_scale` times the NES resolution.
    ///
    /// `timing_scale` multiplies the emulation speed. Both factors are
    /// clamped to their valid ranges with a warning.
    pub fn new(sdl_context: sdl2::Sdl, video_scale: f32, timing_scale: f64) -> Result<Self, String> {
        let video_scale = clamp_with_warning(
            "Video scaling factor",
            video_scale,
            Self::MIN_SCALE,
            Self::MAX_SCALE,
        );
        let timing_scale = clamp_with_warning(
            "Timing scaling factor",
            timing_scale,
            Self::MIN_TIMING_SCALE,
            Self::MAX_TIMING_SCALE,
        );

        let event_pump = sdl_context.event_pump()?;
        let canvas = Self::create_window_and_canvas(&sdl_context, video_scale)?;

        Ok(EventLoop {
            sdl_context,
            canvas,
            event_pump,
            timing_scale,
        })
    }

    fn create_window_and_canvas(
        sdl_context: &sdl2::Sdl,
        scale: f32,
    ) -> Result<Canvas<Window>, String> {
        let scaled_width = (SCREEN_WIDTH as f32 * scale) as u32;
        let scaled_height = (SCREEN_HEIGHT as f32 * scale) as u32;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window("cyclenes", scaled_width, scaled_height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|e| e.to_string())?;
        canvas.set_draw_color(CLEAR_COLOR);
        canvas.clear();
        canvas.present();

        Ok(canvas)
    }

    fn render_frame(
        canvas: &mut Canvas<Window>,
        texture: &mut Texture,
        nes: &Nes,
    ) -> Result<(), String> {
        let rgb = nes.frame().to_rgb24();
        texture
            .update(None, &rgb, SCREEN_WIDTH * 3)
            .map_err(|e| e.to_string())?;

        canvas.set_draw_color(CLEAR_COLOR);
        canvas.clear();
        canvas.copy(texture, None, None)?;
        canvas.present();
        Ok(())
    }

    /// Poll input. Returns false once the user asked to quit.
    fn handle_events(&mut self, nes: &mut Nes) -> bool {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return false,
                Event::KeyDown {
                    keycode: Some(Keycode::F5),
                    repeat: false,
                    ..
                } => {
                    info!("Reset");
                    nes.reset();
                }
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(button) = button_for_key(key) {
                        nes.set_button(0, button, true);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(button) = button_for_key(key) {
                        nes.set_button(0, button, false);
                    }
                }
                _ => {}
            }
        }
        true
    }

    /// Run until the user presses Escape or closes the window.
    ///
    /// One emulated frame is produced per host frame, paced to the TV
    /// system's frame rate times the timing scale. A halted CPU leaves the
    /// last picture on screen.
    pub fn run(&mut self, nes: &mut Nes) -> Result<(), String> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                SCREEN_WIDTH as u32,
                SCREEN_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let timer = self.sdl_context.timer()?;
        let performance_frequency = timer.performance_frequency() as f64;
        let target_frame_time = 1.0 / (nes.tv_system().frames_per_second() * self.timing_scale);
        let mut next_frame = timer.performance_counter() as f64 / performance_frequency;
        let mut halted_reported = false;

        while self.handle_events(nes) {
            if nes.run_frame() == FrameStatus::Halted && !halted_reported {
                warn!("CPU halted at ${:04X}", nes.cpu().pc);
                halted_reported = true;
            } else if !nes.is_halted() {
                halted_reported = false;
            }

            Self::render_frame(&mut self.canvas, &mut texture, nes)?;

            next_frame += target_frame_time;
            let now = timer.performance_counter() as f64 / performance_frequency;
            if next_frame > now {
                std::thread::sleep(std::time::Duration::from_secs_f64(next_frame - now));
            } else if now - next_frame > target_frame_time * 4.0 {
                // Too far behind to catch up; resynchronise
                next_frame = now;
            }
        }
        Ok(())
    }
}

fn clamp_with_warning<T: PartialOrd + Copy + std::fmt::Display>(
    name: &str,
    value: T,
    min: T,
    max: T,
) -> T {
    if value < min {
        warn!("{} {} is below minimum {}. Clamping to {}.", name, value, min, min);
        min
    } else if value > max {
        warn!("{} {} is above maximum {}. Clamping to {}.", name, value, max, max);
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_layout() {
        assert_eq!(button_for_key(Keycode::X), Some(Button::A));
        assert_eq!(button_for_key(Keycode::Z), Some(Button::B));
        assert_eq!(button_for_key(Keycode::Return), Some(Button::Start));
        assert_eq!(button_for_key(Keycode::Left), Some(Button::Left));
        assert_eq!(button_for_key(Keycode::Q), None);
    }

    #[test]
    fn test_scaling_is_clamped() {
        assert_eq!(clamp_with_warning("scale", 0.5, 1.0, 5.0), 1.0);
        assert_eq!(clamp_with_warning("scale", 6.0, 1.0, 5.0), 5.0);
        assert_eq!(clamp_with_warning("scale", 2.5, 1.0, 5.0), 2.5);
    }

    #[test]
    fn test_timing_scale_bounds() {
        assert_eq!(
            clamp_with_warning(
                "speed",
                0.0,
                EventLoop::MIN_TIMING_SCALE,
                EventLoop::MAX_TIMING_SCALE
            ),
            0.001
        );
        assert_eq!(
            clamp_with_warning(
                "speed",
                500.0,
                EventLoop::MIN_TIMING_SCALE,
                EventLoop::MAX_TIMING_SCALE
            ),
            100.0
        );
    }
}
