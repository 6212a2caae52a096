use fnv::{FnvHashMap, FnvHashSet};
use smallvec::SmallVec;

/// Opaque handle for a card, issued by the DOM layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u32);

/// Handle for an element the effects create themselves (particles, ripples).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

/// Anything a tween can write styles to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Card(CardId),
    Element(ElementId),
    Spotlight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    X,
    Y,
    Opacity,
    Scale,
    Rotation,
    RotateX,
    RotateY,
}

/// Animatable visual state of one target. Translation in px, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub scale: f32,
    pub rotation: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            opacity: 1.0,
            scale: 1.0,
            rotation: 0.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
        }
    }
}

impl Style {
    #[inline]
    pub fn get(&self, channel: Channel) -> f32 {
        match channel {
            Channel::X => self.x,
            Channel::Y => self.y,
            Channel::Opacity => self.opacity,
            Channel::Scale => self.scale,
            Channel::Rotation => self.rotation,
            Channel::RotateX => self.rotate_x,
            Channel::RotateY => self.rotate_y,
        }
    }

    #[inline]
    pub fn set(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::X => self.x = value,
            Channel::Y => self.y = value,
            Channel::Opacity => self.opacity = value,
            Channel::Scale => self.scale = value,
            Channel::Rotation => self.rotation = value,
            Channel::RotateX => self.rotate_x = value,
            Channel::RotateY => self.rotate_y = value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    Linear,
    QuadOut,
    QuadInOut,
    SineInOut,
    BackOut,
    BackIn,
}

const BACK_OVERSHOOT: f32 = 1.70158;

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
            Ease::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) * 0.5,
            Ease::BackOut => {
                let c3 = BACK_OVERSHOOT + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + BACK_OVERSHOOT * u * u
            }
            Ease::BackIn => {
                let c3 = BACK_OVERSHOOT + 1.0;
                c3 * t * t * t - BACK_OVERSHOOT * t * t
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Once,
    /// Ping-pong between start and end until killed.
    YoyoForever,
}

/// Follow-up work reported when a finite tween runs to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Unmount(ElementId),
}

#[derive(Clone, Copy, Debug)]
struct Track {
    channel: Channel,
    from: Option<f32>,
    to: f32,
}

/// A property animation. Unset start values are captured from the target's
/// current style when the tween becomes active (after its delay).
#[derive(Clone, Debug)]
pub struct Tween {
    target: Target,
    tracks: SmallVec<[Track; 4]>,
    delay_ms: f64,
    duration_ms: f64,
    ease: Ease,
    playback: Playback,
    elapsed_ms: f64,
    on_complete: Option<Completion>,
}

impl Tween {
    pub fn to(target: Target, duration_ms: f64) -> Self {
        Self {
            target,
            tracks: SmallVec::new(),
            delay_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
            ease: Ease::QuadOut,
            playback: Playback::Once,
            elapsed_ms: 0.0,
            on_complete: None,
        }
    }

    pub fn set(mut self, channel: Channel, to: f32) -> Self {
        self.tracks.push(Track {
            channel,
            from: None,
            to,
        });
        self
    }

    pub fn from_to(mut self, channel: Channel, from: f32, to: f32) -> Self {
        self.tracks.push(Track {
            channel,
            from: Some(from),
            to,
        });
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn yoyo_forever(mut self) -> Self {
        self.playback = Playback::YoyoForever;
        self
    }

    pub fn on_complete(mut self, completion: Completion) -> Self {
        self.on_complete = Some(completion);
        self
    }

    fn capture(&mut self, current: &Style) {
        for track in self.tracks.iter_mut() {
            if track.from.is_none() {
                track.from = Some(current.get(track.channel));
            }
        }
    }

    /// Eased position in [0, 1] plus whether a finite tween has finished.
    fn progress(&self) -> (f32, bool) {
        let active = self.elapsed_ms - self.delay_ms;
        if self.duration_ms <= 0.0 {
            return (1.0, self.playback == Playback::Once);
        }
        match self.playback {
            Playback::Once => {
                let t = (active / self.duration_ms).min(1.0) as f32;
                (self.ease.apply(t), active >= self.duration_ms)
            }
            Playback::YoyoForever => {
                let cycles = active / self.duration_ms;
                let cycle = cycles.floor();
                let mut local = (cycles - cycle) as f32;
                if (cycle as u64) % 2 == 1 {
                    local = 1.0 - local;
                }
                (self.ease.apply(local), false)
            }
        }
    }

    fn write(&self, eased: f32, style: &mut Style) {
        for track in &self.tracks {
            let from = track.from.unwrap_or(track.to);
            style.set(track.channel, from + (track.to - from) * eased);
        }
    }
}

struct PendingTask<T> {
    id: TaskId,
    due_ms: f64,
    payload: T,
}

/// Work produced by one [`Timeline::advance`] step.
pub struct Advance<T> {
    pub fired: Vec<(TaskId, T)>,
    pub completed: Vec<Completion>,
}

/// Discrete-time scheduler for deferred tasks and property tweens.
///
/// Nothing runs on its own: the owner calls `advance` with the elapsed time
/// (the frame loop in the browser, synthetic steps in tests). Every schedule
/// returns a handle that can be cancelled; cancelling a handle that already
/// fired or finished is a no-op.
pub struct Timeline<T> {
    now_ms: f64,
    next_id: u64,
    tasks: Vec<PendingTask<T>>,
    tweens: Vec<(TweenId, Tween)>,
    styles: FnvHashMap<Target, Style>,
    dirty: FnvHashSet<Target>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 1,
            tasks: Vec::new(),
            tweens: Vec::new(),
            styles: FnvHashMap::default(),
            dirty: FnvHashSet::default(),
        }
    }

    fn bump(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn schedule(&mut self, delay_ms: f64, payload: T) -> TaskId {
        let id = TaskId(self.bump());
        self.tasks.push(PendingTask {
            id,
            due_ms: self.now_ms + delay_ms.max(0.0),
            payload,
        });
        id
    }

    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn start(&mut self, mut tween: Tween) -> TweenId {
        let id = TweenId(self.bump());
        if tween.delay_ms <= 0.0 {
            let current = self.style(tween.target);
            tween.capture(&current);
        }
        self.tweens.push((id, tween));
        id
    }

    pub fn kill(&mut self, id: TweenId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|(tid, _)| *tid != id);
        self.tweens.len() != before
    }

    /// Kill an optional handle in place, leaving `None` behind.
    pub fn kill_slot(&mut self, slot: &mut Option<TweenId>) {
        if let Some(id) = slot.take() {
            self.kill(id);
        }
    }

    pub fn kill_tweens_of(&mut self, target: Target) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|(_, tw)| tw.target != target);
        before - self.tweens.len()
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|(tid, _)| *tid == id)
    }

    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    pub fn tweens_of(&self, target: Target) -> usize {
        self.tweens.iter().filter(|(_, tw)| tw.target == target).count()
    }

    pub fn style(&self, target: Target) -> Style {
        self.styles.get(&target).copied().unwrap_or_default()
    }

    /// Write a style immediately, without animation.
    pub fn set_style(&mut self, target: Target, style: Style) {
        self.styles.insert(target, style);
        self.dirty.insert(target);
    }

    /// Drop every tween and the cached style of a target that went away.
    pub fn forget(&mut self, target: Target) {
        self.kill_tweens_of(target);
        self.styles.remove(&target);
        self.dirty.remove(&target);
    }

    pub fn advance(&mut self, dt_ms: f64) -> Advance<T> {
        self.now_ms += dt_ms.max(0.0);
        let now = self.now_ms;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].due_ms <= now {
                due.push(self.tasks.remove(i));
            } else {
                i += 1;
            }
        }
        // stable: equal due times keep scheduling order
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        let fired = due.into_iter().map(|t| (t.id, t.payload)).collect();

        let mut completed = Vec::new();
        let styles = &mut self.styles;
        let dirty = &mut self.dirty;
        self.tweens.retain_mut(|(_, tween)| {
            tween.elapsed_ms += dt_ms.max(0.0);
            if tween.elapsed_ms < tween.delay_ms {
                return true;
            }
            let style = styles.entry(tween.target).or_default();
            tween.capture(style);
            let (eased, finished) = tween.progress();
            tween.write(eased, style);
            dirty.insert(tween.target);
            if finished {
                if let Some(c) = tween.on_complete {
                    completed.push(c);
                }
            }
            !finished
        });

        Advance { fired, completed }
    }

    /// Styles changed since the last drain, for flushing to the page.
    pub fn drain_styles(&mut self) -> Vec<(Target, Style)> {
        let mut out = Vec::with_capacity(self.dirty.len());
        for target in self.dirty.drain() {
            if let Some(style) = self.styles.get(&target) {
                out.push((target, *style));
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.tweens.clear();
        self.styles.clear();
        self.dirty.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eases_hit_their_endpoints() {
        for ease in [
            Ease::Linear,
            Ease::QuadOut,
            Ease::QuadInOut,
            Ease::SineInOut,
            Ease::BackOut,
            Ease::BackIn,
        ] {
            assert!(ease.apply(0.0).abs() < 1e-5, "{:?} at 0", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-5, "{:?} at 1", ease);
        }
    }

    #[test]
    fn yoyo_returns_to_start_after_two_legs() {
        let mut tl: Timeline<()> = Timeline::new();
        let target = Target::Spotlight;
        tl.start(
            Tween::to(target, 100.0)
                .from_to(Channel::X, 0.0, 10.0)
                .ease(Ease::Linear)
                .yoyo_forever(),
        );
        tl.advance(100.0);
        assert!((tl.style(target).x - 10.0).abs() < 1e-4);
        tl.advance(100.0);
        assert!(tl.style(target).x.abs() < 1e-4);
        assert_eq!(tl.active_tweens(), 1);
    }
}
