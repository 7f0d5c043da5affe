//! Grid description and the walkable route monsters follow across it.

use glam::Vec2;

use crate::{CellCoord, ConfigError, Direction};

/// Role a single grid cell plays on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Towers may be built on the cell.
    Constructible,
    /// Monsters may walk across the cell.
    Walkable,
    /// Neither walkable nor constructible.
    Blocked,
}

impl CellKind {
    /// Maps a map character onto a cell kind: `.` constructible, `#` walkable.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Self {
        match symbol {
            '.' => Self::Constructible,
            '#' => Self::Walkable,
            _ => Self::Blocked,
        }
    }
}

/// Rectangular grid of per-cell walkability and constructibility flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Builds a grid from row-major cell kinds.
    pub fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Self, ConfigError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(ConfigError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row, kinds) in rows.iter().enumerate() {
            if kinds.len() != expected {
                return Err(ConfigError::NonRectangularGrid {
                    row,
                    expected,
                    found: kinds.len(),
                });
            }
            cells.extend_from_slice(kinds);
        }

        let columns = u32::try_from(expected).map_err(|_| ConfigError::EmptyGrid)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| ConfigError::EmptyGrid)?;
        Ok(Self {
            columns,
            rows: row_count,
            cells,
        })
    }

    /// Parses a grid from text rows using [`CellKind::from_symbol`].
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigError> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.as_ref().chars().map(CellKind::from_symbol).collect())
                .collect(),
        )
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Kind of the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether monsters may walk across the cell.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(CellKind::Walkable)
    }

    /// Reports whether a tower may be built on the cell.
    #[must_use]
    pub fn is_constructible(&self, cell: CellCoord) -> bool {
        self.kind(cell) == Some(CellKind::Constructible)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Immutable route of unit steps starting at a spawn cell.
///
/// Distance along the path is measured in grid units: each step covers one
/// unit, so the total length equals the number of steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    origin: CellCoord,
    steps: Vec<Direction>,
}

impl Path {
    /// Creates a path from a spawn cell and a sequence of unit steps.
    #[must_use]
    pub fn new(origin: CellCoord, steps: Vec<Direction>) -> Self {
        Self { origin, steps }
    }

    /// Spawn cell where every monster enters.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Unit steps from the spawn to the arrival cell.
    #[must_use]
    pub fn steps(&self) -> &[Direction] {
        &self.steps
    }

    /// Total length of the path in grid units.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.steps.len() as f32
    }

    /// Continuous position reached after travelling `distance` along the path.
    ///
    /// Negative distances are treated as zero; distances past the end resolve
    /// to the arrival point.
    #[must_use]
    pub fn position_at(&self, distance: f32) -> Vec2 {
        let mut position = self.origin.to_point();
        let mut remaining = distance.max(0.0);

        for direction in &self.steps {
            if remaining <= 0.0 {
                break;
            }
            let advance = remaining.min(1.0);
            position += direction.unit() * advance;
            remaining -= advance;
        }

        position
    }

    /// Reports whether `distance` reaches the end of the path.
    #[must_use]
    pub fn has_arrived(&self, distance: f32) -> bool {
        distance >= self.length()
    }

    /// Walkable cells visited by the path, spawn first.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let mut cell = self.origin;
        std::iter::once(cell).chain(self.steps.iter().filter_map(move |direction| {
            cell = direction.neighbor(cell)?;
            Some(cell)
        }))
    }
}

const STEP_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::South,
    Direction::West,
    Direction::North,
];

/// Resolves the walkable route through `grid`.
///
/// The spawn is the first walkable cell of the first row, or failing that the
/// first walkable cell of the first column. From there the route repeatedly
/// moves onto an unvisited walkable neighbour (probing east, south, west, then
/// north) until none remains; the final cell is the arrival point.
pub fn extract_path(grid: &Grid) -> Result<Path, ConfigError> {
    let origin = find_spawn(grid).ok_or(ConfigError::SpawnNotFound)?;

    let mut visited = vec![false; grid.cells.len()];
    if let Some(index) = grid.index(origin) {
        visited[index] = true;
    }

    let mut steps = Vec::new();
    let mut current = origin;
    loop {
        let next = STEP_ORDER.iter().find_map(|&direction| {
            let neighbor = direction.neighbor(current)?;
            let index = grid.index(neighbor)?;
            (grid.is_walkable(neighbor) && !visited[index]).then_some((direction, neighbor, index))
        });

        let Some((direction, neighbor, index)) = next else {
            break;
        };

        visited[index] = true;
        steps.push(direction);
        current = neighbor;
    }

    Ok(Path::new(origin, steps))
}

fn find_spawn(grid: &Grid) -> Option<CellCoord> {
    let in_first_row = (0..grid.columns())
        .map(|column| CellCoord::new(column, 0))
        .find(|cell| grid.is_walkable(*cell));

    in_first_row.or_else(|| {
        (0..grid.rows())
            .map(|row| CellCoord::new(0, row))
            .find(|cell| grid.is_walkable(*cell))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_east() -> Path {
        Path::new(
            CellCoord::new(0, 0),
            vec![Direction::East, Direction::East, Direction::East],
        )
    }

    #[test]
    fn extracts_winding_route() {
        let grid = Grid::parse(&["#..", "##.", ".##"]).expect("grid");
        let path = extract_path(&grid).expect("path");

        assert_eq!(path.origin(), CellCoord::new(0, 0));
        assert_eq!(
            path.steps(),
            &[
                Direction::South,
                Direction::East,
                Direction::South,
                Direction::East
            ]
        );
        assert_eq!(path.cells().last(), Some(CellCoord::new(2, 2)));
    }

    #[test]
    fn first_row_wins_over_first_column() {
        let grid = Grid::parse(&["..#", "#.#", "..#"]).expect("grid");
        let path = extract_path(&grid).expect("path");
        assert_eq!(path.origin(), CellCoord::new(2, 0));
    }

    #[test]
    fn falls_back_to_first_column() {
        let grid = Grid::parse(&["...", "###", "..."]).expect("grid");
        let path = extract_path(&grid).expect("path");
        assert_eq!(path.origin(), CellCoord::new(0, 1));
        assert_eq!(path.length(), 2.0);
    }

    #[test]
    fn missing_spawn_is_reported() {
        let grid = Grid::parse(&["...", ".#.", "..."]).expect("grid");
        assert_eq!(extract_path(&grid), Err(ConfigError::SpawnNotFound));
    }

    #[test]
    fn non_rectangular_grid_is_rejected() {
        assert_eq!(
            Grid::parse(&["#..", "#."]),
            Err(ConfigError::NonRectangularGrid {
                row: 1,
                expected: 3,
                found: 2,
            })
        );
        assert_eq!(Grid::parse::<&str>(&[]), Err(ConfigError::EmptyGrid));
    }

    #[test]
    fn position_interpolates_fractional_steps() {
        let path = Path::new(
            CellCoord::new(1, 1),
            vec![Direction::East, Direction::South],
        );
        assert_eq!(path.position_at(0.0), Vec2::new(1.0, 1.0));
        assert_eq!(path.position_at(0.5), Vec2::new(1.5, 1.0));
        assert_eq!(path.position_at(1.25), Vec2::new(2.0, 1.25));
        assert_eq!(path.position_at(-3.0), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn distance_past_the_end_resolves_to_arrival() {
        let path = straight_east();
        assert_eq!(path.position_at(15.0), Vec2::new(3.0, 0.0));
        assert_eq!(path.position_at(3.0), path.position_at(15.0));
    }

    #[test]
    fn arrival_starts_exactly_at_total_length() {
        let path = straight_east();
        for distance in [0.0, 1.0, 2.5, 2.999] {
            assert!(!path.has_arrived(distance), "{distance} is before the end");
        }
        for distance in [3.0, 3.001, 40.0] {
            assert!(path.has_arrived(distance), "{distance} is past the end");
        }
    }
}
