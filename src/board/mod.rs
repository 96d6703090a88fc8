//! voltbar board support (ESP32-C6)
//!
//! Maps the physical hardware to the capability types the control core
//! drives, so that `main` never names a GPIO or a bus.

pub mod pins;

use core::fmt;

use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Blocking,
    analog::adc::{Adc, AdcCalCurve, AdcConfig, AdcPin, Attenuation},
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, ConfigError as I2cConfigError, I2c},
    peripherals::{ADC1, GPIO0, Peripherals},
    rtc_cntl::{Rtc, RwdtStage},
    spi::master::{Config as SpiConfig, ConfigError as SpiConfigError, Spi},
    time::{Duration, Rate},
    timer::{PeriodicTimer, timg::TimerGroup},
    uart::{Config as UartConfig, ConfigError as UartConfigError, Uart},
};
use log::warn;

use voltbar_kernel::board::SensorAdc;
use voltbar_kernel::drivers::battery::Divider;
use voltbar_kernel::drivers::dfplayer::DfPlayer;
use voltbar_kernel::drivers::display::GraphicsDisplay;
use voltbar_kernel::drivers::eeprom::Eeprom;
use voltbar_kernel::drivers::input::InputDriver;
use voltbar_kernel::drivers::led::StatusLed;
use voltbar_kernel::drivers::st7789::{SPI_FREQ_MHZ, St7789};
use voltbar_kernel::kernel::wake;

/// 100k/10k divider. The curve-calibrated ADC reports millivolts, so
/// one code is one millivolt at the pin.
pub const DIVIDER: Divider = Divider {
    r1_ohms: 100_000.0,
    r2_ohms: 10_000.0,
    vref: 2.5,
    max_code: 2500,
};

const RESTART_TIMEOUT_MS: u64 = 100;

// Type Aliases
pub type TftSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, Delay>;
pub type Tft = St7789<TftSpi, Output<'static>, Output<'static>, Delay>;
pub type Screen = GraphicsDisplay<Tft, Output<'static>>;
pub type Audio = DfPlayer<Uart<'static, Blocking>, Delay>;
pub type Storage = Eeprom<I2c<'static, Blocking>, Delay>;
pub type Led = StatusLed<Output<'static>>;
pub type Buttons = InputDriver<Input<'static>>;

#[derive(Debug)]
pub enum BoardError {
    Spi(SpiConfigError),
    I2c(I2cConfigError),
    Uart(UartConfigError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Spi(e) => write!(f, "spi config: {:?}", e),
            BoardError::I2c(e) => write!(f, "i2c config: {:?}", e),
            BoardError::Uart(e) => write!(f, "uart config: {:?}", e),
        }
    }
}

/// One-shot calibrated reads of the battery divider tap, in millivolts.
pub struct BatterySense {
    adc: Adc<'static, ADC1<'static>, Blocking>,
    pin: AdcPin<GPIO0<'static>, ADC1<'static>, AdcCalCurve<ADC1<'static>>>,
}

impl SensorAdc for BatterySense {
    fn read_code(&mut self) -> u16 {
        match nb::block!(self.adc.read_oneshot(&mut self.pin)) {
            Ok(code) => code,
            Err(e) => {
                warn!("adc: read failed: {:?}", e);
                0
            }
        }
    }
}

/// RTC watchdog, armed only to force a restart.
pub struct Watchdog {
    rtc: Rtc<'static>,
}

impl Watchdog {
    pub fn restart(&mut self) -> ! {
        self.rtc
            .rwdt
            .set_timeout(RwdtStage::Stage0, Duration::from_millis(RESTART_TIMEOUT_MS));
        self.rtc.rwdt.enable();
        loop {
            wake::wait_for_interrupt();
        }
    }
}

/// Complete board hardware, ready to hand to the monitor.
pub struct Board {
    pub display: Screen,
    pub audio: Audio,
    pub storage: Storage,
    pub indicator: Led,
    pub inputs: Buttons,
    pub battery: BatterySense,
    pub watchdog: Watchdog,
    pub tick_timer: PeriodicTimer<'static, Blocking>,
}

impl Board {
    pub fn init(p: Peripherals) -> Result<Self, BoardError> {
        let timg0 = TimerGroup::new(p.TIMG0);
        let tick_timer = PeriodicTimer::new(timg0.timer0);
        let watchdog = Watchdog {
            rtc: Rtc::new(p.LPWR),
        };

        // ADC
        let mut adc_cfg = AdcConfig::new();
        let pin = adc_cfg.enable_pin_with_cal::<_, AdcCalCurve<ADC1>>(p.GPIO0, Attenuation::_11dB);
        let battery = BatterySense {
            adc: Adc::new(p.ADC1, adc_cfg),
            pin,
        };

        // Buttons + trigger
        let pulled_up = InputConfig::default().with_pull(Pull::Up);
        let inputs = InputDriver::new(
            [
                Input::new(p.GPIO18, pulled_up),
                Input::new(p.GPIO19, pulled_up),
                Input::new(p.GPIO20, pulled_up),
                Input::new(p.GPIO21, pulled_up),
            ],
            Input::new(p.GPIO22, pulled_up),
        );

        let indicator = StatusLed::new(Output::new(p.GPIO23, Level::Low, OutputConfig::default()));

        // TFT on SPI2
        let cs = Output::new(p.GPIO14, Level::High, OutputConfig::default());
        let dc = Output::new(p.GPIO11, Level::High, OutputConfig::default());
        let rst = Output::new(p.GPIO10, Level::High, OutputConfig::default());
        let backlight = Output::new(p.GPIO1, Level::Low, OutputConfig::default());

        let spi_cfg = SpiConfig::default().with_frequency(Rate::from_mhz(SPI_FREQ_MHZ));
        let spi_bus = Spi::new(p.SPI2, spi_cfg)
            .map_err(BoardError::Spi)?
            .with_sck(p.GPIO6)
            .with_mosi(p.GPIO7)
            .with_miso(p.GPIO5);
        let Ok(spi_dev) = ExclusiveDevice::new(spi_bus, cs, Delay::new());
        let display = GraphicsDisplay::new(St7789::new(spi_dev, dc, rst, Delay::new()), backlight);

        // EEPROM on I2C0
        let i2c_cfg = I2cConfig::default().with_frequency(Rate::from_khz(pins::I2C_FREQ_KHZ));
        let i2c = I2c::new(p.I2C0, i2c_cfg)
            .map_err(BoardError::I2c)?
            .with_sda(p.GPIO2)
            .with_scl(p.GPIO3);
        let storage = Eeprom::new(i2c, Delay::new());

        // DFPlayer on UART1
        let uart_cfg = UartConfig::default().with_baudrate(pins::AUDIO_BAUD);
        let uart = Uart::new(p.UART1, uart_cfg)
            .map_err(BoardError::Uart)?
            .with_tx(p.GPIO16)
            .with_rx(p.GPIO17);
        let audio = DfPlayer::new(uart, Delay::new());

        Ok(Board {
            display,
            audio,
            storage,
            indicator,
            inputs,
            battery,
            watchdog,
            tick_timer,
        })
    }
}
