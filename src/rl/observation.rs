//! 11-feature observation built from the snake's immediate surroundings
//!
//! Layout (positions are fixed, the network depends on them):
//!
//! | index | feature                            |
//! |-------|------------------------------------|
//! | 0     | danger straight ahead              |
//! | 1     | danger after a right turn          |
//! | 2     | danger after a left turn           |
//! | 3..=6 | facing one-hot: left, right, up, down |
//! | 7     | food left of head                  |
//! | 8     | food right of head                 |
//! | 9     | food above head                    |
//! | 10    | food below head                    |

use crate::game::{Direction, GameView, Point};

/// Length of an observation vector
pub const OBSERVATION_SIZE: usize = 11;

/// Binary feature vector fed to the learner
pub type Observation = [f32; OBSERVATION_SIZE];

/// Probe targets `(ahead, right, left)` for a facing. The tile behind the head
/// is never probed.
fn probe_directions(facing: Direction) -> [Direction; 3] {
    match facing {
        Direction::Right => [Direction::Right, Direction::Down, Direction::Up],
        Direction::Left => [Direction::Left, Direction::Up, Direction::Down],
        Direction::Up => [Direction::Up, Direction::Right, Direction::Left],
        Direction::Down => [Direction::Down, Direction::Left, Direction::Right],
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// Encode the current game view into an observation
pub fn encode<G: GameView + ?Sized>(view: &G) -> Observation {
    let head = view.head();
    let food = view.food();
    let facing = view.direction();
    let block = view.block_size();

    let probe = |dir: Direction| -> Point { head.moved_in_direction(dir, block) };
    let [ahead, right, left] = probe_directions(facing);

    let facing_bits = [
        flag(facing == Direction::Left),
        flag(facing == Direction::Right),
        flag(facing == Direction::Up),
        flag(facing == Direction::Down),
    ];
    debug_assert_eq!(
        facing_bits.iter().sum::<f32>(),
        1.0,
        "facing must be exactly one direction"
    );

    [
        flag(view.is_collision(probe(ahead))),
        flag(view.is_collision(probe(right))),
        flag(view.is_collision(probe(left))),
        facing_bits[0],
        facing_bits[1],
        facing_bits[2],
        facing_bits[3],
        flag(food.x < head.x),
        flag(food.x > head.x),
        flag(food.y < head.y),
        flag(food.y > head.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// View with a pixel-style tile size and an explicit set of deadly tiles
    struct FixedView {
        head: Point,
        direction: Direction,
        food: Point,
        deadly: Vec<Point>,
    }

    impl FixedView {
        fn new(direction: Direction) -> Self {
            Self {
                head: Point::new(100, 100),
                direction,
                food: Point::new(100, 100),
                deadly: Vec::new(),
            }
        }
    }

    impl GameView for FixedView {
        fn head(&self) -> Point {
            self.head
        }

        fn direction(&self) -> Direction {
            self.direction
        }

        fn food(&self) -> Point {
            self.food
        }

        fn block_size(&self) -> i32 {
            20
        }

        fn is_collision(&self, point: Point) -> bool {
            self.deadly.contains(&point)
        }
    }

    const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    #[test]
    fn test_observation_is_binary_with_one_hot_facing() {
        for dir in ALL {
            let mut view = FixedView::new(dir);
            view.food = Point::new(40, 160);
            view.deadly = vec![Point::new(120, 100), Point::new(100, 80)];

            let obs = encode(&view);

            assert_eq!(obs.len(), OBSERVATION_SIZE);
            assert!(obs.iter().all(|&v| v == 0.0 || v == 1.0));
            assert_eq!(obs[3..7].iter().sum::<f32>(), 1.0);
        }
    }

    #[test]
    fn test_facing_bits_order() {
        assert_eq!(encode(&FixedView::new(Direction::Left))[3..7], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(encode(&FixedView::new(Direction::Right))[3..7], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(encode(&FixedView::new(Direction::Up))[3..7], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(encode(&FixedView::new(Direction::Down))[3..7], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_food_up_left() {
        let mut view = FixedView::new(Direction::Right);
        view.food = Point::new(50, 50);

        let obs = encode(&view);

        assert_eq!(obs[7], 1.0);
        assert_eq!(obs[8], 0.0);
        assert_eq!(obs[9], 1.0);
        assert_eq!(obs[10], 0.0);
    }

    #[test]
    fn test_food_on_same_tile_sets_no_food_bits() {
        let obs = encode(&FixedView::new(Direction::Up));
        assert_eq!(obs[7..], [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rotation_table() {
        // (facing, ahead, right, left) as absolute tiles around (100, 100)
        let left_tile = Point::new(80, 100);
        let right_tile = Point::new(120, 100);
        let up_tile = Point::new(100, 80);
        let down_tile = Point::new(100, 120);
        let cases = [
            (Direction::Right, right_tile, down_tile, up_tile),
            (Direction::Left, left_tile, up_tile, down_tile),
            (Direction::Up, up_tile, right_tile, left_tile),
            (Direction::Down, down_tile, left_tile, right_tile),
        ];

        for (facing, ahead, right, left) in cases {
            for (tile, expected) in [
                (ahead, [1.0, 0.0, 0.0]),
                (right, [0.0, 1.0, 0.0]),
                (left, [0.0, 0.0, 1.0]),
            ] {
                let mut view = FixedView::new(facing);
                view.deadly = vec![tile];
                assert_eq!(encode(&view)[0..3], expected, "facing {:?}, tile {:?}", facing, tile);
            }
        }
    }

    #[test]
    fn test_behind_is_never_dangerous() {
        for facing in ALL {
            let mut view = FixedView::new(facing);
            let (dx, dy) = facing.delta();
            view.deadly = vec![Point::new(100 - dx * 20, 100 - dy * 20)];
            assert_eq!(encode(&view)[0..3], [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_encode_real_game() {
        use crate::game::{GameConfig, SnakeGame};

        let game = SnakeGame::new(GameConfig::small());
        let obs = encode(&game);

        // Fresh game faces right in the middle of the board
        assert_eq!(obs[0..3], [0.0, 0.0, 0.0]);
        assert_eq!(obs[4], 1.0);
    }
}
