//! Desktop frontend for the picosim LCD status display.
//!
//! Provides two execution modes:
//!
//! - **GUI mode** (default): the 240x135 panel in a scaled window, with keys
//!   to switch screens, change backlight and rotation, and take screenshots.
//! - **Headless mode** (`--headless`): runs a fixed number of frames and
//!   prints ASCII snapshots of the panel.
//!
//! In both modes a background thread keeps changing the machine state so the
//! status screens are live.

mod device;
mod exerciser;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, Scale, ScaleMode, Window, WindowOptions};
use picosim_lcd_core::font::font28;
use picosim_lcd_core::{
    png, Banner, Color, CpuKind, Depth, Display, DisplayConfig, Machine, SimulatedSensor,
    StatusScreen, TickState, LCD_HEIGHT, LCD_WIDTH,
};
use tracing_subscriber::EnvFilter;

use device::{print_display, HeadlessDevice, SharedView, WindowDevice};
use exerciser::Exerciser;

const TITLE: &str = "picosim LCD";
/// Seconds the product banner stays up at start
const BANNER_TIME: Duration = Duration::from_secs(2);
/// Backlight change per key press
const BRIGHTNESS_STEP: u8 = 10;

// ─── Main ───────────────────────────────────────────────────────────────────

fn usage(prog: &str) -> ! {
    eprintln!("picosim LCD status display v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Usage: {} [options]", prog);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --settings FILE      Load settings from FILE, save them on exit");
    eprintln!("  --depth 12|16        Pixel depth");
    eprintln!("  --fps N              Refresh rate 1-60");
    eprintln!("  --8080               Emulate an 8080 instead of a Z80");
    eprintln!("  --no-panel           Leave the front panel out of the rotation");
    eprintln!("  --status S           Start on registers, panel or memory");
    eprintln!("  --scale N            Window scale 1-6 (default 3)");
    eprintln!("  --headless           Run without GUI");
    eprintln!("  --frames N           Run N frames (headless, default 60)");
    eprintln!("  --snapshot F         Print display at frame F (repeatable)");
    eprintln!();
    eprintln!("GUI keys: Tab/N=Next status 1=Registers 2=Panel 3=Memory");
    eprintln!("          B=Banner W=Waiting Up/Down=Backlight R=Rotate");
    eprintln!("          C=Toggle CPU S=Screenshot Esc=Quit");
    std::process::exit(1);
}

fn arg<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_status(s: &str) -> Option<StatusScreen> {
    match s {
        "registers" | "regs" => Some(StatusScreen::Registers),
        "panel" => Some(StatusScreen::Panel),
        "memory" | "mem" => Some(StatusScreen::Memory),
        _ => None,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage(&args[0]);
    }

    let settings: Option<PathBuf> = arg(&args, "--settings").map(PathBuf::from);
    let mut config = match &settings {
        Some(path) if path.exists() => DisplayConfig::load(path).unwrap_or_else(|e| {
            tracing::warn!("settings {}: {}, using defaults", path.display(), e);
            DisplayConfig::default()
        }),
        _ => DisplayConfig::default(),
    };

    if let Some(bits) = arg(&args, "--depth") {
        match bits.parse().ok().and_then(Depth::from_bits) {
            Some(depth) => config.depth = depth,
            None => usage(&args[0]),
        }
    }
    if let Some(fps) = arg(&args, "--fps").and_then(|s| s.parse().ok()) {
        config.refresh_hz = fps;
    }
    if args.iter().any(|a| a == "--no-panel") {
        config.panel = false;
    }
    if let Some(s) = arg(&args, "--status") {
        match parse_status(s) {
            Some(status) => config.initial_status = status,
            None => usage(&args[0]),
        }
    }
    let cpu = if args.iter().any(|a| a == "--8080") { CpuKind::I8080 } else { CpuKind::Z80 };
    let scale: usize = arg(&args, "--scale")
        .and_then(|s| s.parse().ok())
        .unwrap_or(3)
        .clamp(1, 6);

    let machine = Arc::new(Machine::new(cpu));
    let mut cpu_thread = match Exerciser::start(machine.clone(), config.depth, 0x2545_f491) {
        Ok(ex) => ex,
        Err(e) => {
            eprintln!("Failed to start CPU thread: {}", e);
            std::process::exit(1);
        }
    };

    if args.iter().any(|a| a == "--headless") {
        run_headless(&args, &config, machine);
    } else {
        run_gui(&mut config, machine, scale);
    }
    cpu_thread.stop();

    if let Some(path) = &settings {
        match config.save(path) {
            Ok(()) => tracing::info!("settings saved to {}", path.display()),
            Err(e) => tracing::error!("settings {}: {}", path.display(), e),
        }
    }
}

// ─── Screens ────────────────────────────────────────────────────────────────

fn product_banner(config: &DisplayConfig) -> Banner {
    Banner::new(
        &[
            (config.product.as_str(), Color::Green),
            ("by Udo Munk &", Color::Red),
            ("Thomas Eberhardt", Color::White),
        ],
        font28(),
        Color::Blue,
    )
}

fn waiting_banner() -> Banner {
    Banner::new(&[("Waiting for", Color::Red), ("terminal", Color::Red)], font28(), Color::White)
}

// ─── GUI Mode ───────────────────────────────────────────────────────────────

fn open_window(w: usize, h: usize) -> Window {
    let opts = WindowOptions {
        scale: Scale::X1,
        scale_mode: ScaleMode::AspectRatioStretch,
        resize: true,
        ..Default::default()
    };
    let mut window = Window::new(TITLE, w, h, opts).unwrap_or_else(|e| {
        eprintln!("Failed to create window: {}", e);
        std::process::exit(1);
    });
    window.set_target_fps(60);
    window
}

fn run_gui(config: &mut DisplayConfig, machine: Arc<Machine>, scale: usize) {
    let (width, height) = (LCD_WIDTH as usize, LCD_HEIGHT as usize);
    let (scaled_w, scaled_h) = (width * scale, height * scale);
    let mut window = open_window(scaled_w, scaled_h);

    let (lcd, view) = WindowDevice::new(width, height);
    let mut display = match Display::init(
        config,
        Box::new(lcd),
        machine.clone(),
        Box::new(SimulatedSensor::default()),
    ) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to start display: {}", e);
            std::process::exit(1);
        }
    };
    display.set_custom(Some(Box::new(product_banner(config))));

    let start_time = Instant::now();
    let mut banner_up = true;
    let mut scaled_buf = vec![0u32; scaled_w * scaled_h];
    let mut last_fps_time = Instant::now();
    let mut last_frames = 0u64;
    let mut screenshot_n = 0u32;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if banner_up && start_time.elapsed() >= BANNER_TIME {
            banner_up = false;
            display.show_status(None);
        }
        let pressed = |k| window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Tab) || pressed(Key::N) {
            if display.shows_status() {
                display.next_status();
            } else {
                display.show_status(None);
            }
            banner_up = false;
        }
        for (key, status) in [
            (Key::Key1, StatusScreen::Registers),
            (Key::Key2, StatusScreen::Panel),
            (Key::Key3, StatusScreen::Memory),
        ] {
            if pressed(key) {
                display.show_status(Some(status));
                banner_up = false;
            }
        }
        if pressed(Key::B) {
            display.set_custom(Some(Box::new(product_banner(config))));
            banner_up = false;
        }
        if pressed(Key::W) {
            display.set_custom(Some(Box::new(waiting_banner())));
            banner_up = false;
        }
        if pressed(Key::Up) || pressed(Key::Down) {
            config.brightness = if pressed(Key::Up) {
                config.brightness.saturating_add(BRIGHTNESS_STEP).min(100)
            } else {
                config.brightness.saturating_sub(BRIGHTNESS_STEP)
            };
            display.set_brightness(config.brightness);
            tracing::info!("backlight {}%", config.brightness);
        }
        if pressed(Key::R) {
            config.rotated = !config.rotated;
            display.set_rotation(config.rotated);
        }
        if pressed(Key::C) {
            let next = match machine.cpu() {
                CpuKind::Z80 => CpuKind::I8080,
                CpuKind::I8080 => CpuKind::Z80,
            };
            machine.set_cpu(next);
            tracing::info!("CPU now {:?}", next);
        }
        if pressed(Key::S) {
            let f = format!("screenshot_{:04}.png", screenshot_n);
            let last = view.lock().unwrap_or_else(PoisonError::into_inner).last.clone();
            match last.map(|pm| png::save_screenshot(&pm, Path::new(&f))) {
                Some(Ok(())) => screenshot_n += 1,
                Some(Err(e)) => tracing::error!("screenshot {}: {}", f, e),
                None => tracing::warn!("screenshot: no frame yet"),
            }
        }

        let frames = present(&view, &mut scaled_buf, width, height, scale);
        if let Err(e) = window.update_with_buffer(&scaled_buf, scaled_w, scaled_h) {
            tracing::error!("window update: {}", e);
            break;
        }

        let elapsed = last_fps_time.elapsed();
        if elapsed >= Duration::from_secs(2) {
            let fps = (frames - last_frames) as f64 / elapsed.as_secs_f64();
            window.set_title(&format!("{} - {:.1} fps", TITLE, fps));
            last_frames = frames;
            last_fps_time = Instant::now();
        }
    }

    display.shutdown();
}

/// Copy the panel into the window buffer, scaled up. Returns the number of
/// frames the panel has received.
fn present(view: &SharedView, buf: &mut [u32], width: usize, height: usize, scale: usize) -> u64 {
    let view = view.lock().unwrap_or_else(PoisonError::into_inner);
    let scaled_w = width * scale;
    for y in 0..height {
        for x in 0..width {
            let c = view.pixels[y * width + x];
            for dy in 0..scale {
                let row = (y * scale + dy) * scaled_w + x * scale;
                buf[row..row + scale].fill(c);
            }
        }
    }
    view.frames
}

// ─── Headless Mode ──────────────────────────────────────────────────────────

fn run_headless(args: &[String], config: &DisplayConfig, machine: Arc<Machine>) {
    let max_frames: u64 = arg(args, "--frames").and_then(|s| s.parse().ok()).unwrap_or(60);
    let snapshots: Vec<u64> = args
        .iter()
        .enumerate()
        .filter(|(_, a)| *a == "--snapshot")
        .filter_map(|(i, _)| args.get(i + 1).and_then(|s| s.parse().ok()))
        .collect();

    let lcd = HeadlessDevice::default();
    let (display, mut task) =
        Display::new(config, Box::new(lcd.clone()), machine, Box::new(SimulatedSensor::default()));
    task.bring_up();
    display.show_status(None);

    let interval = Duration::from_micros(1_000_000 / config.refresh_hz() as u64);
    let start = Instant::now();
    for frame in 1..=max_frames {
        task.tick();
        if snapshots.contains(&frame) {
            println!("Frame {} ({:?}):", frame, display.status());
            if let Some(pm) = lcd.last_frame() {
                print_display(&pm);
            }
        }
        std::thread::sleep(interval);
    }

    if snapshots.is_empty() {
        println!("Frame {} ({:?}):", max_frames, display.status());
        if let Some(pm) = lcd.last_frame() {
            print_display(&pm);
        }
    }

    display.set_custom(None);
    if task.tick() != TickState::Stopped || !display.is_done() {
        tracing::error!("display task did not stop");
    }
    println!(
        "{} frames in {:.2}s, {} sent to the panel",
        max_frames,
        start.elapsed().as_secs_f64(),
        lcd.frames()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use picosim_lcd_core::{Frame, Pixmap, Screen};

    fn render(screen: &mut dyn Screen) -> Pixmap {
        let machine = Machine::default();
        let mut pm = Pixmap::new(LCD_WIDTH, LCD_HEIGHT, Depth::Rgb565);
        let mut sensor = || 25.0f32;
        screen.draw(&mut Frame { pixmap: &mut pm, machine: &machine, sensor: &mut sensor }, true);
        pm
    }

    #[test]
    fn test_waiting_banner_uses_large_font() {
        let pm = render(&mut waiting_banner());
        // "Waiting for" is 11 cells of 14 px, two 30 px lines centered
        let (x0, y0) = ((240 - 11 * 14) / 2, (135 - 2 * 30) / 2);
        let mut expect = Pixmap::new(LCD_WIDTH, LCD_HEIGHT, Depth::Rgb565);
        let red = expect.color(Color::Red);
        expect.draw_char(x0, y0, b'W', font28(), red, 0);
        for y in y0..y0 + 28 {
            for x in x0..x0 + 14 {
                assert_eq!(pm.pixel(x, y), expect.pixel(x, y));
            }
        }
        assert_eq!(pm.pixel(0, 0), pm.color(Color::White));
    }

    #[test]
    fn test_product_banner_line_colors() {
        let config = DisplayConfig { product: "Z80pack".into(), ..DisplayConfig::default() };
        let pm = render(&mut product_banner(&config));
        let y0 = (135 - 3 * 30) / 2;
        let lit = |y: u16| -> Vec<u16> {
            (y..y + 28)
                .flat_map(|y| (1..239).map(move |x| (x, y)))
                .map(|(x, y)| pm.pixel(x, y))
                .filter(|&c| c != 0)
                .collect()
        };
        for (row, color) in [(0, Color::Green), (1, Color::Red), (2, Color::White)] {
            let px = lit(y0 + row * 30);
            assert!(!px.is_empty());
            assert!(px.iter().all(|&c| c == pm.color(color)), "line {}", row);
        }
    }
}
