//! Screen Rendering Module
//!
//! This module presents the software renderer's framebuffer using winit for
//! window management and softbuffer for software blitting. The emulated
//! display is scaled up with nearest-neighbour sampling.

use crate::core::EmulatorCore;
use crate::raster::SoftwareRenderer;
use crate::scheduler::QuantumResult;
use psx_hw::specs::display;
use softbuffer::{Context, Surface};
use std::num::NonZeroU32;
use std::rc::Rc;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::Window;

// ================================================================================================
// Window Layout Constants
// ================================================================================================

/// Integer scale from emulated pixels to window pixels
const SCALE: u32 = 2;

/// Window width
const WINDOW_WIDTH: u32 = display::WIDTH * SCALE;

/// Window height
const WINDOW_HEIGHT: u32 = display::HEIGHT * SCALE;

/// Colour shown outside the emulated display area
const BORDER_COLOR: u32 = 0x000000;

/// Emulator display application
pub struct EmulatorDisplay {
    emulator: EmulatorCore<SoftwareRenderer>,

    window: Option<Rc<Window>>,
    surface: Option<Surface<Rc<Window>, Rc<Window>>>,
}

impl EmulatorDisplay {
    pub fn new(emulator: EmulatorCore<SoftwareRenderer>) -> Self {
        Self {
            emulator,
            window: None,
            surface: None,
        }
    }

    fn open_window(
        event_loop: &ActiveEventLoop,
    ) -> Result<(Rc<Window>, Surface<Rc<Window>, Rc<Window>>), Box<dyn std::error::Error>> {
        let window = Rc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title("psxemu")
                    .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT)),
            )?,
        );

        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;
        Ok((window, surface))
    }
}

impl ApplicationHandler for EmulatorDisplay {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        match Self::open_window(event_loop) {
            Ok((window, surface)) => {
                self.window = Some(window.clone());
                self.surface = Some(surface);
                // Kick off the first frame
                window.request_redraw();
            }
            Err(e) => {
                error!("Failed to open window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("=== Emulation Stopped ===");
                self.emulator.print_final_state();
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut())
                    && let Err(e) = Self::render(window, surface, self.emulator.renderer())
                {
                    error!("Failed to present frame: {}", e);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // One quantum per frame
        let result = self.emulator.step();

        let should_stop = matches!(result, QuantumResult::Error(_)) || self.emulator.should_stop();

        if should_stop {
            info!("=== Stop Condition Reached ===");
            self.emulator.print_final_state();
            event_loop.exit();
            return;
        }

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::Poll);
    }
}

impl EmulatorDisplay {
    fn render(
        window: &Window,
        surface: &mut Surface<Rc<Window>, Rc<Window>>,
        renderer: &SoftwareRenderer,
    ) -> Result<(), softbuffer::SoftBufferError> {
        let size = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized
            return Ok(());
        };
        surface.resize(width, height)?;

        let mut buffer = surface.buffer_mut()?;
        blit_scaled(
            &mut buffer,
            width.get(),
            height.get(),
            renderer.framebuffer(),
            renderer.resolution().width,
            renderer.resolution().height,
        );
        buffer.present()
    }
}

/// Copy `src` into `dst` at [`SCALE`]x with nearest-neighbour sampling,
/// filling whatever `src` does not cover with [`BORDER_COLOR`]
fn blit_scaled(
    dst: &mut [u32],
    dst_width: u32,
    dst_height: u32,
    src: &[u32],
    src_width: u32,
    src_height: u32,
) {
    for y in 0..dst_height {
        for x in 0..dst_width {
            let (sx, sy) = (x / SCALE, y / SCALE);
            let pixel = if sx < src_width && sy < src_height {
                src[(sy * src_width + sx) as usize]
            } else {
                BORDER_COLOR
            };
            if let Some(out) = dst.get_mut((y * dst_width + x) as usize) {
                *out = pixel;
            }
        }
    }
}

pub fn run(emulator: EmulatorCore<SoftwareRenderer>) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = EmulatorDisplay::new(emulator);
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_doubles_pixels_and_borders_the_rest() {
        let src = [1, 2, 3, 4];
        let mut dst = [0xFFu32; 5 * 4];
        blit_scaled(&mut dst, 5, 4, &src, 2, 2);

        #[rustfmt::skip]
        let expected = [
            1, 1, 2, 2, BORDER_COLOR,
            1, 1, 2, 2, BORDER_COLOR,
            3, 3, 4, 4, BORDER_COLOR,
            3, 3, 4, 4, BORDER_COLOR,
        ];
        assert_eq!(dst, expected);
    }
}
