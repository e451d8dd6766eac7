/// Travel direction of an [`Oscillator`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    #[inline]
    fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Fixed step size and bound of an oscillator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OscillatorConfig {
    pub increment: f32,
    pub max: f32,
}

impl OscillatorConfig {
    pub const fn new(increment: f32, max: f32) -> Self {
        Self { increment, max }
    }
}

/// Bounded ping-pong scalar.
///
/// Invariant: `value.abs() <= max`. Each [`step`](Self::step) moves the value by
/// `increment` in the current direction; when the result reaches or passes the
/// bound it is clamped onto the bound and the direction reverses. The next step
/// therefore moves away from the bound, so a crossing flips exactly once.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Oscillator {
    value: f32,
    direction: Direction,
    config: OscillatorConfig,
}

impl Oscillator {
    /// Starts at `0.0`, moving forward.
    pub fn new(config: OscillatorConfig) -> Self {
        debug_assert!(config.increment > 0.0 && config.max > 0.0);
        Self {
            value: 0.0,
            direction: Direction::Forward,
            config,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn is_forward(&self) -> bool {
        self.direction == Direction::Forward
    }

    /// Advances one frame. Returns `true` if the direction flipped on this step.
    pub fn step(&mut self) -> bool {
        let OscillatorConfig { increment, max } = self.config;

        self.value += self.direction.sign() * increment;

        if self.value.abs() >= max {
            self.value = self.value.clamp(-max, max);
            self.direction = self.direction.reversed();
            return true;
        }

        false
    }
}

/// Oscillators driven by the triangle demo.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Horizontal offset. Computed every frame; the demo does not apply it.
    pub tri: OscillatorConfig,
    /// Color shift fed to the fragment stage.
    pub hue: OscillatorConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tri: OscillatorConfig::new(0.0005, 0.7),
            hue: OscillatorConfig::new(0.0005, 1.0),
        }
    }
}
