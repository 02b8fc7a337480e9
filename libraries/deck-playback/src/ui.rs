//! Optional UI bindings
//!
//! Every control is independently optional. The engine renders its state into
//! whatever is bound after each transition; nothing here reads from the
//! controls. User input flows the other way, as [`Command`]s.
//!
//! Slider writes made through [`SliderView::set_value`] are programmatic. A
//! view that forwards its own change notifications must flag them so the host
//! does not feed them back into the engine as user input.
//!
//! [`Command`]: crate::events::Command

use crate::types::LoopMode;

pub const PLAY_LABEL: &str = "▶";
pub const PAUSE_LABEL: &str = "⏸";
pub const MUTED_LABEL: &str = "🔇";
pub const UNMUTED_LABEL: &str = "🔊";
pub const LOOP_ALL_LABEL: &str = "🔁";
pub const LOOP_ONE_LABEL: &str = "🔂";
pub const LOOP_OFF_LABEL: &str = "➡";

/// Clickable control
pub trait ButtonView {
    fn set_label(&mut self, label: &str);
    fn set_enabled(&mut self, enabled: bool);
}

/// Range control
pub trait SliderView {
    /// Programmatic write
    fn set_value(&mut self, value: f32);

    fn set_enabled(&mut self, _enabled: bool) {}
}

/// Text display
pub trait LabelView {
    fn set_text(&mut self, text: &str);
}

/// Label of the play/pause button
pub fn play_label(playing: bool) -> &'static str {
    if playing {
        PAUSE_LABEL
    } else {
        PLAY_LABEL
    }
}

/// Label of the mute button; a silent output also counts as muted
pub fn mute_label(muted: bool, output_volume: f32) -> &'static str {
    if muted || output_volume <= 0.0 {
        MUTED_LABEL
    } else {
        UNMUTED_LABEL
    }
}

pub fn loop_label(mode: LoopMode) -> &'static str {
    match mode {
        LoopMode::All => LOOP_ALL_LABEL,
        LoopMode::One => LOOP_ONE_LABEL,
        LoopMode::Off => LOOP_OFF_LABEL,
    }
}

/// Everything the controls display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiSnapshot<'a> {
    pub playing: bool,
    pub fading: bool,
    pub muted: bool,
    pub output_volume: f32,
    pub loop_mode: LoopMode,
    pub navigable: bool,
    pub track_name: &'a str,
}

/// The controls bound for one `init`
#[derive(Default)]
pub struct UiBindings {
    pub play_button: Option<Box<dyn ButtonView>>,
    pub mute_button: Option<Box<dyn ButtonView>>,
    pub volume_slider: Option<Box<dyn SliderView>>,
    pub volume_down_button: Option<Box<dyn ButtonView>>,
    pub volume_up_button: Option<Box<dyn ButtonView>>,
    pub prev_track_button: Option<Box<dyn ButtonView>>,
    pub next_track_button: Option<Box<dyn ButtonView>>,
    pub loop_button: Option<Box<dyn ButtonView>>,
    pub track_name_label: Option<Box<dyn LabelView>>,

    /// One slider per equalizer band, lowest band first
    pub equalizer_sliders: Vec<Box<dyn SliderView>>,
}

impl std::fmt::Debug for UiBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiBindings")
            .field("play_button", &self.play_button.is_some())
            .field("mute_button", &self.mute_button.is_some())
            .field("volume_slider", &self.volume_slider.is_some())
            .field("volume_down_button", &self.volume_down_button.is_some())
            .field("volume_up_button", &self.volume_up_button.is_some())
            .field("prev_track_button", &self.prev_track_button.is_some())
            .field("next_track_button", &self.next_track_button.is_some())
            .field("loop_button", &self.loop_button.is_some())
            .field("track_name_label", &self.track_name_label.is_some())
            .field("equalizer_sliders", &self.equalizer_sliders.len())
            .finish()
    }
}

impl UiBindings {
    /// No controls at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has_equalizer(&self) -> bool {
        !self.equalizer_sliders.is_empty()
    }

    /// Reflect an output volume on the slider
    pub fn show_volume(&mut self, volume: f32) {
        if let Some(slider) = self.volume_slider.as_mut() {
            slider.set_value(volume);
        }
    }

    /// Reflect band gains on the equalizer sliders
    pub fn show_equalizer_gains(&mut self, gains: impl IntoIterator<Item = f32>) {
        for (slider, gain) in self.equalizer_sliders.iter_mut().zip(gains) {
            slider.set_value(gain);
        }
    }

    /// Render a full state snapshot into every bound control
    pub fn render(&mut self, view: &UiSnapshot<'_>) {
        if let Some(button) = self.play_button.as_mut() {
            button.set_label(play_label(view.playing));
            button.set_enabled(!view.fading);
        }
        if let Some(button) = self.mute_button.as_mut() {
            button.set_label(mute_label(view.muted, view.output_volume));
            button.set_enabled(true);
        }
        if let Some(slider) = self.volume_slider.as_mut() {
            slider.set_value(view.output_volume);
            slider.set_enabled(true);
        }
        for button in [
            self.volume_down_button.as_mut(),
            self.volume_up_button.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            button.set_enabled(true);
        }
        for button in [
            self.prev_track_button.as_mut(),
            self.next_track_button.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            button.set_enabled(view.navigable);
        }
        if let Some(button) = self.loop_button.as_mut() {
            button.set_label(loop_label(view.loop_mode));
            button.set_enabled(true);
        }
        if let Some(label) = self.track_name_label.as_mut() {
            label.set_text(view.track_name);
        }
    }

    /// Disable every bound control (nothing playable)
    pub fn disable_all(&mut self) {
        for button in [
            self.play_button.as_mut(),
            self.mute_button.as_mut(),
            self.volume_down_button.as_mut(),
            self.volume_up_button.as_mut(),
            self.prev_track_button.as_mut(),
            self.next_track_button.as_mut(),
            self.loop_button.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            button.set_enabled(false);
        }
        if let Some(slider) = self.volume_slider.as_mut() {
            slider.set_enabled(false);
        }
        for slider in &mut self.equalizer_sliders {
            slider.set_enabled(false);
        }
        if let Some(label) = self.track_name_label.as_mut() {
            label.set_text("");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct ButtonState {
        label: String,
        enabled: bool,
    }

    struct Button(Rc<RefCell<ButtonState>>);

    impl ButtonView for Button {
        fn set_label(&mut self, label: &str) {
            self.0.borrow_mut().label = label.to_string();
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.0.borrow_mut().enabled = enabled;
        }
    }

    fn snapshot(track_name: &str) -> UiSnapshot<'_> {
        UiSnapshot {
            playing: true,
            fading: false,
            muted: false,
            output_volume: 0.5,
            loop_mode: LoopMode::All,
            navigable: false,
            track_name,
        }
    }

    #[test]
    fn labels() {
        assert_eq!(play_label(false), "▶");
        assert_eq!(play_label(true), "⏸");
        assert_eq!(mute_label(false, 0.0), "🔇");
        assert_eq!(mute_label(true, 0.7), "🔇");
        assert_eq!(mute_label(false, 0.7), "🔊");
        assert_eq!(loop_label(LoopMode::One), "🔂");
        assert_eq!(loop_label(LoopMode::Off), "➡");
    }

    #[test]
    fn render_into_bound_controls() {
        let play = Rc::new(RefCell::new(ButtonState::default()));
        let next = Rc::new(RefCell::new(ButtonState::default()));
        let mut ui = UiBindings {
            play_button: Some(Box::new(Button(play.clone()))),
            next_track_button: Some(Box::new(Button(next.clone()))),
            ..Default::default()
        };

        ui.render(&snapshot("theme"));
        assert_eq!(play.borrow().label, "⏸");
        assert!(play.borrow().enabled);
        assert!(!next.borrow().enabled);

        ui.render(&UiSnapshot {
            fading: true,
            ..snapshot("theme")
        });
        assert!(!play.borrow().enabled);
    }

    #[test]
    fn disable_all_controls() {
        let play = Rc::new(RefCell::new(ButtonState {
            label: String::new(),
            enabled: true,
        }));
        let mut ui = UiBindings {
            play_button: Some(Box::new(Button(play.clone()))),
            ..Default::default()
        };

        ui.disable_all();
        assert!(!play.borrow().enabled);
    }

    #[test]
    fn unbound_ui_is_fine() {
        let mut ui = UiBindings::none();
        ui.render(&snapshot(""));
        ui.show_volume(0.3);
        ui.disable_all();
        assert!(!ui.has_equalizer());
    }
}
