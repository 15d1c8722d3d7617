use crate::expander::Expander;
use crate::indicator::{
    highest_layer, layer_indicators, ready_indicator, LayerIndicators, LayerState, LedState,
    UserHooks,
};
use crate::link::{BusFault, LinkStatus, RetryCounter};
use crate::local::LocalMatrix;
use crate::matrix::{merge_row, MatrixSnapshot, RowIndex};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::{info, warn};

/// Everything the keyboard needs between scans, owned by the polling loop.
pub struct Board<I2C, D, Row, Col, Led> {
    expander: Expander<I2C, D>,
    local: LocalMatrix<Row, Col>,
    layer_led: Led,
    ready_led: Led,
    matrix: MatrixSnapshot,
    retry: RetryCounter,
    /// Last layer LEDs shown, redrawn when the expander comes back
    indicators: LayerIndicators,
}

impl<I2C, D, Row, Col, Led> Board<I2C, D, Row, Col, Led>
where
    I2C: I2c,
    D: DelayNs,
    Row: OutputPin,
    Col: InputPin,
    Led: OutputPin,
{
    pub fn new(
        expander: Expander<I2C, D>,
        local: LocalMatrix<Row, Col>,
        layer_led: Led,
        ready_led: Led,
    ) -> Self {
        Self {
            expander,
            local,
            layer_led,
            ready_led,
            matrix: MatrixSnapshot::new(),
            retry: RetryCounter::new(),
            indicators: layer_indicators(0),
        }
    }

    pub fn init(&mut self) {
        if let Err(fault) = self.attach_expander() {
            warn!("right side not responding: {fault:?}");
        }
        self.local.init();
    }

    /// A freshly configured expander drives its LED low, which lights it.
    fn attach_expander(&mut self) -> Result<(), BusFault> {
        self.expander.init()?;
        self.expander.set_indicator(self.indicators.expander);
        match self.expander.status() {
            LinkStatus::Failed(fault) => Err(fault),
            _ => Ok(()),
        }
    }

    #[inline]
    #[must_use]
    pub const fn matrix(&self) -> &MatrixSnapshot {
        &self.matrix
    }

    #[inline]
    #[must_use]
    pub const fn link_status(&self) -> LinkStatus {
        self.expander.status()
    }

    /// One pass over every row, returns whether any stored row changed.
    pub fn scan(&mut self) -> bool {
        if !self.expander.status().is_ok() && self.retry.tick() {
            info!("trying to reset expander");
            match self.attach_expander() {
                Ok(()) => info!("right side attached"),
                Err(fault) => warn!("right side not responding: {fault:?}"),
            }
        }

        let mut changed = false;
        for row in RowIndex::all() {
            self.expander.select_row(row);
            self.local.select_row(row);
            let onboard = self.local.read_columns();
            let expander = self.expander.read_columns();
            changed |= self.matrix.store(row, merge_row(expander, onboard));
            // Only one row may be low at a time or keys ghost through the diodes
            self.local.unselect_rows();
        }
        changed
    }

    /// Shows the top layer on the two layer LEDs, then hands over to `user`.
    pub fn on_layer_change(&mut self, state: LayerState, user: &mut impl UserHooks) -> LayerState {
        self.indicators = layer_indicators(highest_layer(state));
        let _ = self.layer_led.set_state(self.indicators.local.into());
        self.expander.set_indicator(self.indicators.expander);
        user.layer_state_set_user(state)
    }

    pub fn on_lock_change(&mut self, leds: LedState, user: &mut impl UserHooks) -> bool {
        let res = user.led_update_user(leds);
        if res {
            let _ = self
                .ready_led
                .set_state(ready_indicator(leds.caps_lock()).into());
        }
        res
    }
}
