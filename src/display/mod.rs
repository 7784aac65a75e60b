mod pixel_buffer;

pub use pixel_buffer::PixelBuffer;

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub const DEFAULT_WIDTH: u32 = 960;
pub const DEFAULT_HEIGHT: u32 = 600;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

/// Host events the show cares about. Window visibility/focus events drive
/// pause/resume the same way page-visibility events do in a browser host.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    MouseDown { x: i32, y: i32 },
    FocusGained,
    FocusLost,
    Hidden,
    Shown,
    Resized { width: u32, height: u32 },
}

impl Display {
    /// Create display with custom resolution and VSync settings
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn present(
        &mut self,
        target: &mut RenderTarget,
        buffer: &PixelBuffer,
    ) -> Result<(), String> {
        target
            .texture
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::MouseButtonDown { x, y, .. } => {
                    events.push(InputEvent::MouseDown { x, y });
                },
                Event::Window { win_event, .. } => match win_event {
                    WindowEvent::FocusGained => events.push(InputEvent::FocusGained),
                    WindowEvent::FocusLost => events.push(InputEvent::FocusLost),
                    WindowEvent::Hidden | WindowEvent::Minimized => {
                        events.push(InputEvent::Hidden);
                    },
                    WindowEvent::Shown | WindowEvent::Restored => {
                        events.push(InputEvent::Shown);
                    },
                    WindowEvent::SizeChanged(w, h) | WindowEvent::Resized(w, h) => {
                        self.width = w.max(1) as u32;
                        self.height = h.max(1) as u32;
                        events.push(InputEvent::Resized {
                            width: self.width,
                            height: self.height,
                        });
                    },
                    _ => {},
                },
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create a streaming texture target matching the pixel buffer size
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self { texture })
    }
}
