use crate::Error;

/// Throttle for each row of the action grid.
const ACCELERATIONS: [f64; 3] = [1.0, 0.0, -0.5];

/// Steering for each column of the action grid.
const STEERINGS: [f64; 3] = [-1.0, 0.0, 1.0];

/// One of the nine discrete actions a vehicle can take.
///
/// Actions form a 3x3 grid: the row (`index / 3`) picks forward, coast or reverse,
/// and the column (`index % 3`) picks left, straight or right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Action(u8);

/// The continuous control inputs an [Action] maps to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Control {
    /// Throttle, from -0.5 (reverse) to 1 (full ahead).
    pub acceleration: f64,
    /// Steering, from -1 (left) to 1 (right).
    pub steering: f64,
}

impl Action {
    /// The number of distinct actions.
    pub const COUNT: u8 = 9;

    /// Coast straight ahead.
    pub const IDLE: Action = Action(4);

    /// Creates an action from its index.
    pub fn new(index: u8) -> Result<Self, Error> {
        if index < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(Error::InvalidAction(index))
        }
    }

    /// Picks the action for a set of pressed arrow keys.
    /// Up takes priority over down.
    pub fn from_keys(up: bool, down: bool, left: bool, right: bool) -> Self {
        let row = if up {
            0
        } else if down {
            2
        } else {
            1
        };
        let col = if left {
            0
        } else if right {
            2
        } else {
            1
        };
        Self(3 * row + col)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// The control inputs for this action.
    pub fn control(self) -> Control {
        let idx = self.0 as usize;
        Control {
            acceleration: ACCELERATIONS[idx / 3],
            steering: STEERINGS[idx % 3],
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self, Error> {
        Self::new(index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn control_grid() {
        let control = Action::new(0).unwrap().control();
        assert_eq!(control, Control { acceleration: 1.0, steering: -1.0 });

        let control = Action::IDLE.control();
        assert_eq!(control, Control { acceleration: 0.0, steering: 0.0 });

        let control = Action::new(8).unwrap().control();
        assert_eq!(control, Control { acceleration: -0.5, steering: 1.0 });
    }

    #[test]
    fn out_of_range() {
        assert_eq!(Action::new(9), Err(Error::InvalidAction(9)));
        assert_eq!(Action::try_from(200), Err(Error::InvalidAction(200)));
    }

    #[test]
    fn keys() {
        assert_eq!(Action::from_keys(true, false, true, false).index(), 0);
        assert_eq!(Action::from_keys(true, false, false, false).index(), 1);
        assert_eq!(Action::from_keys(true, true, false, true).index(), 2);
        assert_eq!(Action::from_keys(false, false, true, false).index(), 3);
        assert_eq!(Action::from_keys(false, false, false, false), Action::IDLE);
        assert_eq!(Action::from_keys(false, false, false, true).index(), 5);
        assert_eq!(Action::from_keys(false, true, true, false).index(), 6);
        assert_eq!(Action::from_keys(false, true, false, false).index(), 7);
        assert_eq!(Action::from_keys(false, true, false, true).index(), 8);
    }
}
