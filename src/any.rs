//! Runtime choice of receiver behind one concrete type.
//!
//! Boards that select the receiver at start-up (from a jumper, a stored
//! setting or whichever link comes up first) hold an [`AnyReceiver`] and
//! hand it to the receiver task like any other [`Receiver`].

#[cfg(not(feature = "proto-joystick"))]
use core::convert::Infallible;
#[cfg(not(feature = "proto-joystick"))]
use core::marker::PhantomData;

use embassy_time::Duration;
use receiver_core::{
    Controls, ControlsPwm, Eui48, NullReceiver, Receiver, ReceiverState, StickValues, Switches,
};

#[cfg(feature = "proto-ibus")]
use ibus_proto::IbusReceiver;
#[cfg(feature = "proto-joystick")]
use joystick_proto::JoystickReceiver;
#[cfg(feature = "proto-sbus")]
use sbus_proto::SbusReceiver;

/// Radio driver bound required by the joystick variant.
#[cfg(feature = "proto-joystick")]
pub trait AnyTransceiver: joystick_proto::Transceiver {}
#[cfg(feature = "proto-joystick")]
impl<T: joystick_proto::Transceiver> AnyTransceiver for T {}

/// Radio driver bound required by the joystick variant.
#[cfg(not(feature = "proto-joystick"))]
pub trait AnyTransceiver {}
#[cfg(not(feature = "proto-joystick"))]
impl<T> AnyTransceiver for T {}

/// One of the supported receivers. `T` is the joystick's radio driver.
pub enum AnyReceiver<'a, T> {
    Null(NullReceiver),
    #[cfg(feature = "proto-sbus")]
    Sbus(SbusReceiver<'a>),
    #[cfg(feature = "proto-ibus")]
    Ibus(IbusReceiver<'a>),
    #[cfg(feature = "proto-joystick")]
    Joystick(JoystickReceiver<'a, T>),
    #[cfg(not(feature = "proto-joystick"))]
    #[doc(hidden)]
    Never(Infallible, PhantomData<(&'a (), T)>),
}

macro_rules! dispatch {
    ($self:expr, $r:ident => $body:expr) => {
        match $self {
            AnyReceiver::Null($r) => $body,
            #[cfg(feature = "proto-sbus")]
            AnyReceiver::Sbus($r) => $body,
            #[cfg(feature = "proto-ibus")]
            AnyReceiver::Ibus($r) => $body,
            #[cfg(feature = "proto-joystick")]
            AnyReceiver::Joystick($r) => $body,
            #[cfg(not(feature = "proto-joystick"))]
            AnyReceiver::Never(never, _) => match *never {},
        }
    };
}

impl<T> Default for AnyReceiver<'_, T> {
    fn default() -> Self {
        Self::Null(NullReceiver::new())
    }
}

impl<T> From<NullReceiver> for AnyReceiver<'_, T> {
    fn from(receiver: NullReceiver) -> Self {
        Self::Null(receiver)
    }
}

#[cfg(feature = "proto-sbus")]
impl<'a, T> From<SbusReceiver<'a>> for AnyReceiver<'a, T> {
    fn from(receiver: SbusReceiver<'a>) -> Self {
        Self::Sbus(receiver)
    }
}

#[cfg(feature = "proto-ibus")]
impl<'a, T> From<IbusReceiver<'a>> for AnyReceiver<'a, T> {
    fn from(receiver: IbusReceiver<'a>) -> Self {
        Self::Ibus(receiver)
    }
}

#[cfg(feature = "proto-joystick")]
impl<'a, T> From<JoystickReceiver<'a, T>> for AnyReceiver<'a, T> {
    fn from(receiver: JoystickReceiver<'a, T>) -> Self {
        Self::Joystick(receiver)
    }
}

// Every method is forwarded, including the defaulted ones, so variant
// overrides (switch-backed aux channels, radio identity) are kept.
impl<T: AnyTransceiver> Receiver for AnyReceiver<'_, T> {
    async fn wait_for_data(&mut self, timeout: Duration) -> bool {
        dispatch!(self, r => r.wait_for_data(timeout).await)
    }

    fn update(&mut self, tick_delta: u32) -> bool {
        dispatch!(self, r => r.update(tick_delta))
    }

    fn channel_raw(&self, index: usize) -> u16 {
        dispatch!(self, r => r.channel_raw(index))
    }

    fn state(&self) -> &ReceiverState {
        dispatch!(self, r => r.state())
    }

    fn state_mut(&mut self) -> &mut ReceiverState {
        dispatch!(self, r => r.state_mut())
    }

    fn controls(&self) -> Controls {
        dispatch!(self, r => r.controls())
    }

    fn stick_values(&self) -> StickValues {
        dispatch!(self, r => r.stick_values())
    }

    fn controls_pwm(&self) -> ControlsPwm {
        dispatch!(self, r => r.controls_pwm())
    }

    fn auxiliary_channel_count(&self) -> usize {
        dispatch!(self, r => r.auxiliary_channel_count())
    }

    fn auxiliary_channel(&self, index: usize) -> u16 {
        dispatch!(self, r => r.auxiliary_channel(index))
    }

    fn switch(&self, index: usize) -> u8 {
        dispatch!(self, r => r.switch(index))
    }

    fn set_switch(&mut self, index: usize, value: u8) {
        dispatch!(self, r => r.set_switch(index, value))
    }

    fn switches(&self) -> Switches {
        dispatch!(self, r => r.switches())
    }

    fn reset_sticks(&mut self) {
        dispatch!(self, r => r.reset_sticks())
    }

    fn my_eui(&self) -> Eui48 {
        dispatch!(self, r => r.my_eui())
    }

    fn primary_peer_eui(&self) -> Eui48 {
        dispatch!(self, r => r.primary_peer_eui())
    }

    fn broadcast_my_eui(&self) {
        dispatch!(self, r => r.broadcast_my_eui())
    }
}
