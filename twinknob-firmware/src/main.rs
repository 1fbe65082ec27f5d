//! Twinknob - OLED and dual rotary encoder panel
//!
//! Main firmware binary for RP2040 boards. An SH1106 display and two
//! seesaw rotary encoders share I2C0; the encoder positions are polled
//! and shown on the display whenever either knob moves.

#![no_std]
#![no_main]

mod config;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Delay, Duration, Ticker, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use twinknob_core::dashboard::Dashboard;
use twinknob_core::monitor::ChangeTracker;
use twinknob_display::{DisplayError, DisplayInterface, I2cInterface, NoReset, ResetControl, Sh1106};
use twinknob_drivers::encoder::SeesawEncoder;
use twinknob_hal::{EhDelay, EhI2c, SharedI2c};

use crate::config::{APP_CONFIG, FRAME_BUFFER_LEN};

type Bus = EhI2c<I2c<'static, I2C0, Blocking>>;

// Shared bus and framebuffer storage (must live forever)
// Only the main task touches the bus, so the lock leaves interrupts enabled
static I2C_BUS: StaticCell<SharedI2c<NoopRawMutex, Bus>> = StaticCell::new();
static FRAME_BUF: StaticCell<[u8; FRAME_BUFFER_LEN]> = StaticCell::new();

/// Retry period while a device does not answer
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Twinknob firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // I2C0 on GPIO4 (SDA) / GPIO5 (SCL), the Pico's default pins
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = APP_CONFIG.i2c().frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let bus: &'static SharedI2c<_, _> = I2C_BUS.init(SharedI2c::new(EhI2c::new(i2c)));
    info!("I2C initialized at {} Hz", APP_CONFIG.i2c_frequency_hz);

    let settings = APP_CONFIG.display;
    let interface = unwrap!(I2cInterface::new(bus, settings.address));
    let frame_buf = FRAME_BUF.init([0u8; FRAME_BUFFER_LEN]);
    let mut display = unwrap!(Sh1106::configure(
        interface,
        frame_buf,
        settings.panel(),
        NoReset
    ));

    while let Err(e) = bring_up_display(&mut display) {
        warn!("Display at {=u8:#x} not ready: {}", settings.address, e);
        Timer::after(RETRY_DELAY).await;
    }
    info!("Display {}x{} initialized", settings.width, settings.height);

    let encoders = APP_CONFIG.encoders;
    let mut knobs = [
        SeesawEncoder::new(bus, encoders.right, EhDelay::new(Delay)).with_invert(encoders.invert),
        SeesawEncoder::new(bus, encoders.left, EhDelay::new(Delay)).with_invert(encoders.invert),
    ];
    for knob in knobs.iter_mut() {
        match knob.begin() {
            Ok(id) => info!("Encoder at {=u8:#x}: chip id {=u8:#x}", knob.address(), id),
            Err(e) => warn!("Encoder at {=u8:#x} not ready: {}", knob.address(), e),
        }
    }

    let dashboard = Dashboard::default();
    let mut tracker = ChangeTracker::<2>::new();
    // Draw the initial screen even though nothing has moved yet
    let mut dirty = true;

    let mut ticker = Ticker::every(Duration::from_millis(APP_CONFIG.poll_interval_ms as u64));
    info!("Polling every {} ms", APP_CONFIG.poll_interval_ms);

    loop {
        match tracker.poll(&mut knobs) {
            Ok(changed) => dirty |= changed,
            Err(e) => {
                warn!("Encoder read failed: {}", e);
                ticker.next().await;
                continue;
            }
        }

        if dirty {
            let positions = *tracker.positions();
            dashboard.render(display.framebuffer_mut(), &positions);
            match display.show() {
                Ok(()) => {
                    debug!("Positions: {}", positions);
                    dirty = false;
                }
                // Frame stays dirty and is sent again next tick
                Err(e) => warn!("Display update failed: {}", e),
            }
        }

        ticker.next().await;
    }
}

/// Power up the panel, send the init sequence and apply display settings
fn bring_up_display<DI, RST>(display: &mut Sh1106<'_, DI, RST>) -> Result<(), DisplayError>
where
    DI: DisplayInterface,
    RST: ResetControl,
{
    display.power_on()?;
    display.init_display()?;

    if let Some(level) = APP_CONFIG.display.contrast {
        display.set_contrast(level)?;
    }
    if APP_CONFIG.display.invert {
        display.set_invert(true)?;
    }
    Ok(())
}
