//! Single-threaded tick logic.
//!
//! [`Simulation`] owns the mutable board state and knows how to advance it
//! by one step. It has no notion of threads or status; the [`SnakeEngine`]
//! wraps it in the tick lock and decides when a step may run.
//!
//! [`SnakeEngine`]: super::SnakeEngine

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::debug;

use super::config::EngineConfig;
use super::direction::Direction;
use super::error::{EngineError, EngineResult};
use super::state::{Board, Point, Snake};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Plain move, no collision
    Moved,
    /// Head landed on fruit; the snake grew and the fruit was replaced
    AteFruit,
    /// Head landed on a wall; body restored to its pre-tick shape
    HitWall,
    /// Head landed on its own body
    HitBody,
}

impl TickOutcome {
    /// Whether the outcome ends the game
    pub fn is_fatal(&self) -> bool {
        matches!(self, TickOutcome::HitWall | TickOutcome::HitBody)
    }
}

/// Board state advanced one tick at a time
#[derive(Debug, Clone)]
pub struct Simulation {
    board: Board,
    snake: Snake,
    fruits: Vec<Point>,
    score: u32,
    tick: u64,
    last_update: Instant,
    frame_interval: Duration,
    fruit_count: usize,
    points_per_fruit: u32,
    rng: StdRng,
}

impl Simulation {
    /// Build a fresh board with the snake centred and fruit placed.
    pub fn new(width: i32, height: i32, config: &EngineConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::InvalidConfig)?;

        let board = Board::new(width, height)?;
        let snake = board.starting_snake();

        let free = board.interior_len().saturating_sub(snake.len());
        if free < config.fruit_count {
            return Err(EngineError::NotEnoughRoom {
                free,
                needed: config.fruit_count,
            });
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut sim = Self {
            board,
            snake,
            fruits: Vec::new(),
            score: 0,
            tick: 0,
            last_update: Instant::now(),
            frame_interval: config.frame_interval(),
            fruit_count: config.fruit_count,
            points_per_fruit: config.points_per_fruit,
            rng,
        };
        sim.regenerate_fruit();

        Ok(sim)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn fruits(&self) -> &[Point] {
        &self.fruits
    }

    /// Fruit eaten so far
    pub fn raw_score(&self) -> u32 {
        self.score
    }

    /// Displayed score, `raw_score * points_per_fruit`, capped at `u32::MAX`
    pub fn score(&self) -> u32 {
        self.score.saturating_mul(self.points_per_fruit)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Whether a full frame interval has passed since the last tick
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_update) >= self.frame_interval
    }

    /// Run one tick in `direction`, stamping it at `now`.
    ///
    /// Collision checks are exclusive and ordered: wall, then body, then
    /// fruit. The caller is responsible for timing and status checks.
    pub fn step(&mut self, direction: Direction, now: Instant) -> TickOutcome {
        let outcome = match self.snake.advance(direction) {
            Some(tail) => self.resolve(tail),
            None => TickOutcome::Moved,
        };
        self.mark_updated(now);
        outcome
    }

    fn resolve(&mut self, tail: Point) -> TickOutcome {
        let Some(head) = self.snake.head() else {
            return TickOutcome::Moved;
        };

        if self.board.is_wall(head.x, head.y) {
            // Undo the move: the new head goes, the old tail comes back.
            self.snake.drop_head();
            self.snake.push_tail(tail);
            debug!(x = head.x, y = head.y, "snake hit wall");
            TickOutcome::HitWall
        } else if self.snake.head_hits_body() {
            debug!(x = head.x, y = head.y, "snake hit itself");
            TickOutcome::HitBody
        } else if self.fruits.contains(&head) {
            self.score = self.score.saturating_add(1);
            self.snake.push_tail(tail);
            self.regenerate_fruit();
            debug!(
                score = self.score(),
                length = self.snake.len(),
                "fruit eaten"
            );
            TickOutcome::AteFruit
        } else {
            TickOutcome::Moved
        }
    }

    fn mark_updated(&mut self, now: Instant) {
        self.last_update = now;
        self.tick += 1;
    }

    /// Replace every fruit with fresh placements on free cells.
    ///
    /// When the snake leaves fewer free cells than `fruit_count`, only
    /// the remaining free cells are filled.
    pub(crate) fn regenerate_fruit(&mut self) {
        let occupied: HashSet<(i32, i32)> = self.snake.points().map(Point::position).collect();

        // Reservoir sampling keeps memory at fruit_count, not board size
        self.fruits = self
            .board
            .interior()
            .filter(|cell| !occupied.contains(cell))
            .choose_multiple(&mut self.rng, self.fruit_count)
            .into_iter()
            .map(|(x, y)| Point::fruit(x, y))
            .collect();
    }

    #[cfg(test)]
    pub(crate) fn set_fruits(&mut self, fruits: Vec<Point>) {
        self.fruits = fruits;
    }

    #[cfg(test)]
    pub(crate) fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::PointKind;

    fn sim(width: i32, height: i32) -> Simulation {
        Simulation::new(width, height, &EngineConfig::seeded(7)).unwrap()
    }

    fn assert_fruit_valid(sim: &Simulation) {
        for fruit in sim.fruits() {
            assert_eq!(fruit.kind, PointKind::Fruit);
            assert!(!sim.board().walls().contains(fruit), "fruit on wall");
            assert!(!sim.snake().contains(fruit), "fruit on snake");
        }
        let unique: HashSet<_> = sim.fruits().iter().collect();
        assert_eq!(unique.len(), sim.fruits().len());
    }

    #[test]
    fn test_new_simulation() {
        let sim = sim(10, 10);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.score(), 0);
        assert_eq!(
            sim.snake().to_vec(),
            vec![Point::snake(5, 5), Point::snake(6, 5)]
        );
        assert_eq!(sim.fruits().len(), 2);
        assert_fruit_valid(&sim);
    }

    #[test]
    fn test_rejects_bad_construction() {
        assert!(matches!(
            Simulation::new(2, 2, &EngineConfig::default()),
            Err(EngineError::BoardTooSmall { .. })
        ));

        // 3x5 leaves three interior cells, two taken by the snake
        assert_eq!(
            Simulation::new(3, 5, &EngineConfig::default()).unwrap_err(),
            EngineError::NotEnoughRoom { free: 1, needed: 2 }
        );

        let config = EngineConfig {
            frame_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(10, 10, &config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_is_due_respects_frame_interval() {
        let sim = sim(10, 10);
        let start = sim.last_update();
        assert!(!sim.is_due(start));
        assert!(!sim.is_due(start + Duration::from_millis(499)));
        assert!(sim.is_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let mut sim = sim(10, 10);
        sim.set_fruits(vec![Point::fruit(1, 1)]);
        let now = sim.last_update() + sim.frame_interval();

        let outcome = sim.step(Direction::Up, now);

        assert_eq!(outcome, TickOutcome::Moved);
        assert_eq!(
            sim.snake().to_vec(),
            vec![Point::snake(5, 4), Point::snake(5, 5)]
        );
        assert_eq!(sim.tick(), 1);
        assert_eq!(sim.last_update(), now);
    }

    #[test]
    fn test_eating_fruit_ahead() {
        let mut sim = sim(10, 10);
        sim.set_fruits(vec![Point::fruit(5, 4), Point::fruit(1, 1)]);
        let old_fruits = sim.fruits().to_vec();

        let outcome = sim.step(Direction::Up, Instant::now());

        assert_eq!(outcome, TickOutcome::AteFruit);
        assert_eq!(sim.raw_score(), 1);
        assert_eq!(sim.score(), 1);
        assert_eq!(sim.snake().len(), 3);
        assert_eq!(sim.snake().head(), Some(Point::snake(5, 4)));
        assert_eq!(sim.snake().tail(), Some(Point::snake(6, 5)));
        assert_eq!(sim.fruits().len(), 2);
        assert_fruit_valid(&sim);
        assert_ne!(sim.fruits(), old_fruits.as_slice());
    }

    #[test]
    fn test_points_per_fruit_scales_score() {
        let config = EngineConfig {
            points_per_fruit: 10,
            seed: Some(1),
            ..Default::default()
        };
        let mut sim = Simulation::new(10, 10, &config).unwrap();
        sim.set_fruits(vec![Point::fruit(5, 4)]);

        sim.step(Direction::Up, Instant::now());

        assert_eq!(sim.raw_score(), 1);
        assert_eq!(sim.score(), 10);
    }

    #[test]
    fn test_huge_points_per_fruit_saturates() {
        let config = EngineConfig {
            points_per_fruit: u32::MAX,
            seed: Some(4),
            ..Default::default()
        };
        let mut sim = Simulation::new(10, 10, &config).unwrap();
        let mut now = Instant::now();

        for head in [Point::fruit(5, 4), Point::fruit(5, 3)] {
            sim.set_fruits(vec![head]);
            now += sim.frame_interval();
            assert_eq!(sim.step(Direction::Up, now), TickOutcome::AteFruit);
        }

        assert_eq!(sim.raw_score(), 2);
        assert_eq!(sim.score(), u32::MAX);
    }

    #[test]
    fn test_largest_board_places_fruit() {
        let sim = sim(Board::MAX_WIDTH, Board::MAX_HEIGHT);
        assert_eq!(sim.fruits().len(), 2);
        assert_fruit_valid(&sim);
    }

    #[test]
    fn test_running_into_top_wall_restores_shape() {
        let mut sim = sim(10, 10);
        sim.set_fruits(vec![Point::fruit(1, 1), Point::fruit(8, 8)]);
        let mut now = Instant::now();

        let mut outcome = TickOutcome::Moved;
        let mut before = sim.snake().to_vec();
        while !outcome.is_fatal() {
            before = sim.snake().to_vec();
            now += sim.frame_interval();
            outcome = sim.step(Direction::Up, now);
        }

        assert_eq!(outcome, TickOutcome::HitWall);
        assert_eq!(before, vec![Point::snake(5, 1), Point::snake(5, 2)]);
        assert_eq!(sim.snake().to_vec(), before);
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.tick(), 5);
    }

    #[test]
    fn test_wall_hit_restores_longer_snake() {
        let mut sim = sim(10, 10);
        let body = vec![
            Point::snake(1, 4),
            Point::snake(2, 4),
            Point::snake(3, 4),
            Point::snake(3, 5),
        ];
        sim.set_snake(Snake::from_points(body.clone()));
        sim.set_fruits(vec![Point::fruit(8, 8)]);

        let outcome = sim.step(Direction::Left, Instant::now());

        assert_eq!(outcome, TickOutcome::HitWall);
        assert_eq!(sim.snake().to_vec(), body);
    }

    #[test]
    fn test_self_collision() {
        let mut sim = sim(10, 10);
        sim.set_snake(Snake::from_points([
            Point::snake(5, 5),
            Point::snake(4, 5),
            Point::snake(3, 5),
            Point::snake(2, 5),
            Point::snake(1, 5),
        ]));
        sim.set_fruits(vec![Point::fruit(8, 8)]);
        let mut now = Instant::now();

        // Right, down, left, then up into the old head cell
        for dir in [Direction::Right, Direction::Down, Direction::Left] {
            now += sim.frame_interval();
            assert_eq!(sim.step(dir, now), TickOutcome::Moved);
        }
        let before = sim.snake().to_vec();
        let outcome = sim.step(Direction::Up, now + sim.frame_interval());

        assert_eq!(outcome, TickOutcome::HitBody);
        assert_eq!(sim.snake().len(), before.len());
        assert_eq!(sim.snake().head(), Some(Point::snake(5, 5)));
    }

    #[test]
    fn test_wall_checked_before_fruit() {
        let mut sim = sim(10, 10);
        sim.set_snake(Snake::from_points([Point::snake(5, 1), Point::snake(5, 2)]));
        // A fruit sitting on a wall cell can only be reached through the wall
        sim.set_fruits(vec![Point::fruit(5, 0)]);

        assert_eq!(sim.step(Direction::Up, Instant::now()), TickOutcome::HitWall);
        assert_eq!(sim.raw_score(), 0);
    }

    #[test]
    fn test_regeneration_fills_only_free_cells() {
        let config = EngineConfig {
            fruit_count: 5,
            seed: Some(3),
            ..Default::default()
        };
        let mut sim = Simulation::new(4, 6, &config).unwrap();
        // Interior is 4x2 = 8 cells; fill six of them with the snake
        sim.set_snake(Snake::from_points([
            Point::snake(1, 1),
            Point::snake(1, 2),
            Point::snake(2, 2),
            Point::snake(3, 2),
            Point::snake(4, 2),
            Point::snake(4, 1),
        ]));

        sim.regenerate_fruit();

        let mut cells: Vec<_> = sim.fruits().iter().map(Point::position).collect();
        cells.sort();
        assert_eq!(cells, vec![(2, 1), (3, 1)]);
    }

    #[test]
    fn test_seeded_placement_is_reproducible() {
        let a = sim(20, 20);
        let b = sim(20, 20);
        assert_eq!(a.fruits(), b.fruits());
    }
}
