//! Global hotkeys mapped to the two logical actions

use crate::error::StartupError;
use global_hotkey::{hotkey::HotKey, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    TriggerCapture,
    Quit,
}

/// Parsed hotkeys and the action each one fires
#[derive(Debug, Clone)]
pub struct HotkeyBindings {
    bindings: Vec<(HotKey, HotkeyAction)>,
}

impl HotkeyBindings {
    pub fn parse(trigger: &str, quit: &str) -> Result<Self, StartupError> {
        let trigger_key = parse_hotkey(trigger)?;
        let quit_key = parse_hotkey(quit)?;
        if trigger_key.id() == quit_key.id() {
            return Err(StartupError::Hotkey {
                hotkey: quit.to_string(),
                reason: "same key as the capture trigger".to_string(),
            });
        }

        Ok(Self {
            bindings: vec![
                (trigger_key, HotkeyAction::TriggerCapture),
                (quit_key, HotkeyAction::Quit),
            ],
        })
    }

    pub fn action_for(&self, id: u32) -> Option<HotkeyAction> {
        self.bindings
            .iter()
            .find(|(key, _)| key.id() == id)
            .map(|(_, action)| *action)
    }

    /// Only presses fire an action; releases and unknown ids are ignored
    pub fn route(&self, event: &GlobalHotKeyEvent) -> Option<HotkeyAction> {
        if event.state != HotKeyState::Pressed {
            return None;
        }
        self.action_for(event.id)
    }

    pub fn keys(&self) -> impl Iterator<Item = HotKey> + '_ {
        self.bindings.iter().map(|(key, _)| *key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Act on one drained batch of presses.
///
/// At most one capture runs per batch. The capture blocks the UI thread, so
/// presses made meanwhile are only seen afterwards; `pending_after` collects
/// them and they are dropped. A quit among them still ends the loop.
pub fn dispatch_actions(
    actions: &[HotkeyAction],
    trigger: impl FnOnce(),
    pending_after: impl FnOnce() -> Vec<HotkeyAction>,
) -> LoopControl {
    if actions.contains(&HotkeyAction::Quit) {
        return LoopControl::Quit;
    }

    let presses = count_triggers(actions);
    if presses == 0 {
        return LoopControl::Continue;
    }

    trigger();

    let late = pending_after();
    let dropped = presses - 1 + count_triggers(&late);
    if dropped > 0 {
        debug!(dropped, "trigger presses made during a capture dropped");
    }

    if late.contains(&HotkeyAction::Quit) {
        LoopControl::Quit
    } else {
        LoopControl::Continue
    }
}

fn count_triggers(actions: &[HotkeyAction]) -> usize {
    actions
        .iter()
        .filter(|a| **a == HotkeyAction::TriggerCapture)
        .count()
}

fn parse_hotkey(identifier: &str) -> Result<HotKey, StartupError> {
    HotKey::from_str(identifier.trim()).map_err(|e| StartupError::Hotkey {
        hotkey: identifier.to_string(),
        reason: e.to_string(),
    })
}

/// Owns the OS registration; must live on the thread running the event loop
pub struct HotkeyRouter {
    manager: GlobalHotKeyManager,
    bindings: HotkeyBindings,
    bound: bool,
}

impl HotkeyRouter {
    pub fn register(bindings: HotkeyBindings) -> Result<Self, StartupError> {
        let manager = GlobalHotKeyManager::new().map_err(|e| StartupError::Hotkey {
            hotkey: String::new(),
            reason: format!("failed to create hotkey manager: {e}"),
        })?;

        for (key, action) in &bindings.bindings {
            manager.register(*key).map_err(|e| StartupError::Hotkey {
                hotkey: format!("{key:?}"),
                reason: e.to_string(),
            })?;
            info!(hotkey = ?key, ?action, "registered global hotkey");
        }

        Ok(Self {
            manager,
            bindings,
            bound: true,
        })
    }

    /// Pending pressed actions, oldest first; never blocks
    pub fn drain(&self) -> Vec<HotkeyAction> {
        let receiver = GlobalHotKeyEvent::receiver();
        let mut actions = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            debug!(?event, "hotkey event");
            if let Some(action) = self.bindings.route(&event) {
                actions.push(action);
            }
        }
        actions
    }

    pub fn unbind_all(&mut self) {
        if !self.bound {
            return;
        }
        let keys: Vec<HotKey> = self.bindings.keys().collect();
        if let Err(e) = self.manager.unregister_all(&keys) {
            warn!(error = %e, "failed to unregister hotkeys");
        }
        self.bound = false;
    }
}

impl Drop for HotkeyRouter {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u32, state: HotKeyState) -> GlobalHotKeyEvent {
        GlobalHotKeyEvent { id, state }
    }

    #[test]
    fn default_keys_parse() {
        let bindings = HotkeyBindings::parse("`", "Escape").unwrap();
        assert_eq!(bindings.keys().count(), 2);
    }

    #[test]
    fn modifier_combinations_parse() {
        assert!(HotkeyBindings::parse("ctrl+shift+KeyT", "Escape").is_ok());
    }

    #[test]
    fn unparsable_key_is_a_startup_error() {
        let err = HotkeyBindings::parse("not a key", "Escape").unwrap_err();
        match err {
            StartupError::Hotkey { hotkey, .. } => assert_eq!(hotkey, "not a key"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn identical_keys_are_rejected() {
        assert!(matches!(
            HotkeyBindings::parse("Escape", "Escape"),
            Err(StartupError::Hotkey { .. })
        ));
    }

    #[test]
    fn presses_route_to_their_action() {
        let bindings = HotkeyBindings::parse("`", "Escape").unwrap();
        let trigger_id = HotKey::from_str("`").unwrap().id();
        let quit_id = HotKey::from_str("Escape").unwrap().id();

        assert_eq!(
            bindings.route(&event(trigger_id, HotKeyState::Pressed)),
            Some(HotkeyAction::TriggerCapture)
        );
        assert_eq!(
            bindings.route(&event(quit_id, HotKeyState::Pressed)),
            Some(HotkeyAction::Quit)
        );
    }

    fn pressed(bindings: &HotkeyBindings, keys: &[&str]) -> Vec<HotkeyAction> {
        keys.iter()
            .map(|k| event(HotKey::from_str(k).unwrap().id(), HotKeyState::Pressed))
            .filter_map(|e| bindings.route(&e))
            .collect()
    }

    #[test]
    fn presses_made_during_a_capture_are_dropped() {
        let bindings = HotkeyBindings::parse("`", "Escape").unwrap();
        let first = pressed(&bindings, &["`"]);
        let during = pressed(&bindings, &["`", "`", "`"]);

        let mut captures = 0;
        let control = dispatch_actions(&first, || captures += 1, || during);

        assert_eq!(captures, 1);
        assert_eq!(control, LoopControl::Continue);
    }

    #[test]
    fn one_capture_per_batch() {
        let bindings = HotkeyBindings::parse("`", "Escape").unwrap();
        let batch = pressed(&bindings, &["`", "`", "`"]);

        let mut captures = 0;
        dispatch_actions(&batch, || captures += 1, Vec::new);
        assert_eq!(captures, 1);
    }

    #[test]
    fn quit_pressed_during_a_capture_is_kept() {
        let bindings = HotkeyBindings::parse("`", "Escape").unwrap();
        let first = pressed(&bindings, &["`"]);
        let during = pressed(&bindings, &["`", "Escape"]);

        let mut captures = 0;
        let control = dispatch_actions(&first, || captures += 1, || during);

        assert_eq!(captures, 1);
        assert_eq!(control, LoopControl::Quit);
    }

    #[test]
    fn quit_in_batch_skips_the_capture() {
        let bindings = HotkeyBindings::parse("`", "Escape").unwrap();
        let batch = pressed(&bindings, &["`", "Escape"]);

        let mut captures = 0;
        let mut asked = false;
        let control = dispatch_actions(&batch, || captures += 1, || {
            asked = true;
            Vec::new()
        });

        assert_eq!(control, LoopControl::Quit);
        assert_eq!(captures, 0);
        assert!(!asked);
    }

    #[test]
    fn empty_batch_does_nothing() {
        let mut captures = 0;
        let control = dispatch_actions(&[], || captures += 1, Vec::new);
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(captures, 0);
    }

    #[test]
    fn releases_and_unknown_ids_are_ignored() {
        let bindings = HotkeyBindings::parse("`", "Escape").unwrap();
        let trigger_id = HotKey::from_str("`").unwrap().id();

        assert_eq!(bindings.route(&event(trigger_id, HotKeyState::Released)), None);
        assert_eq!(bindings.route(&event(trigger_id.wrapping_add(1), HotKeyState::Pressed)), None);
    }
}
