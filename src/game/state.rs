use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use super::direction::Direction;
use super::error::{EngineError, EngineResult};

/// What occupies a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    Snake,
    Wall,
    Fruit,
}

/// A tagged cell on the board.
///
/// Equality and hashing only look at the coordinates, so a fruit and a
/// snake segment on the same cell compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub kind: PointKind,
}

impl Point {
    pub fn new(x: i32, y: i32, kind: PointKind) -> Self {
        Self { x, y, kind }
    }

    pub fn snake(x: i32, y: i32) -> Self {
        Self::new(x, y, PointKind::Snake)
    }

    pub fn wall(x: i32, y: i32) -> Self {
        Self::new(x, y, PointKind::Wall)
    }

    pub fn fruit(x: i32, y: i32) -> Self {
        Self::new(x, y, PointKind::Fruit)
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Neighbouring cell in a direction, keeping the kind
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            kind: self.kind,
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

/// Engine lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Stopped,
    Running,
    Paused,
    GameOver,
}

impl GameStatus {
    pub(crate) fn to_bits(self) -> u8 {
        match self {
            GameStatus::Stopped => 0,
            GameStatus::Running => 1,
            GameStatus::Paused => 2,
            GameStatus::GameOver => 3,
        }
    }

    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits {
            1 => GameStatus::Running,
            2 => GameStatus::Paused,
            3 => GameStatus::GameOver,
            _ => GameStatus::Stopped,
        }
    }
}

/// Fixed-size playing field with its border walls.
///
/// The constructor places the snake at `(height / 2, width / 2)`, so the
/// `x` axis spans `0..height` and the `y` axis spans `0..width`. Walls sit
/// where `x` is `0` or `height - 1`, or `y` is `0` or `width - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    width: i32,
    height: i32,
    walls: Vec<Point>,
}

impl Board {
    /// Smallest width that keeps the starting snake off the walls
    pub const MIN_WIDTH: i32 = 3;
    /// Smallest height that keeps the starting snake off the walls
    pub const MIN_HEIGHT: i32 = 5;
    /// Largest accepted width
    pub const MAX_WIDTH: i32 = 1000;
    /// Largest accepted height
    pub const MAX_HEIGHT: i32 = 1000;

    pub fn new(width: i32, height: i32) -> EngineResult<Self> {
        if width < Self::MIN_WIDTH || height < Self::MIN_HEIGHT {
            return Err(EngineError::BoardTooSmall { width, height });
        }
        if width > Self::MAX_WIDTH || height > Self::MAX_HEIGHT {
            return Err(EngineError::BoardTooLarge { width, height });
        }

        // Border only, row by row
        let mut walls = Vec::with_capacity(2 * (width as usize + height as usize));
        for x in 0..height {
            if x == 0 || x == height - 1 {
                walls.extend((0..width).map(|y| Point::wall(x, y)));
            } else {
                walls.push(Point::wall(x, 0));
                walls.push(Point::wall(x, width - 1));
            }
        }

        Ok(Self {
            width,
            height,
            walls,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Extent of the `x` axis
    pub fn x_extent(&self) -> i32 {
        self.height
    }

    /// Extent of the `y` axis
    pub fn y_extent(&self) -> i32 {
        self.width
    }

    pub fn walls(&self) -> &[Point] {
        &self.walls
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == self.height - 1 || y == self.width - 1
    }

    /// All non-wall cells, row by row
    pub fn interior(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (1..self.height - 1).flat_map(move |x| (1..self.width - 1).map(move |y| (x, y)))
    }

    pub fn interior_len(&self) -> usize {
        (self.height - 2) as usize * (self.width - 2) as usize
    }

    /// The two-segment starting snake, head first
    pub fn starting_snake(&self) -> Snake {
        let x = self.height / 2;
        let y = self.width / 2;
        Snake::from_points([Point::snake(x, y), Point::snake(x + 1, y)])
    }
}

/// The snake body, head at the front
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Point>,
}

impl Snake {
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            body: points
                .into_iter()
                .map(|p| Point::snake(p.x, p.y))
                .collect(),
        }
    }

    pub fn head(&self) -> Option<Point> {
        self.body.front().copied()
    }

    pub fn tail(&self) -> Option<Point> {
        self.body.back().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.body.iter()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.body.iter().copied().collect()
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.body.contains(point)
    }

    /// Check if the head shares a cell with any later segment
    pub fn head_hits_body(&self) -> bool {
        match self.head() {
            Some(head) => self.body.iter().skip(1).any(|p| *p == head),
            None => false,
        }
    }

    /// Push a new head one cell ahead and drop the tail.
    ///
    /// Returns the removed tail so the caller can put it back.
    pub(crate) fn advance(&mut self, direction: Direction) -> Option<Point> {
        let new_head = self.head()?.moved_in_direction(direction);
        self.body.push_front(new_head);
        self.body.pop_back()
    }

    pub(crate) fn drop_head(&mut self) -> Option<Point> {
        self.body.pop_front()
    }

    pub(crate) fn push_tail(&mut self, point: Point) {
        self.body.push_back(point);
    }
}
