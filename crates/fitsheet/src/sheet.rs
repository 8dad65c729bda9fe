//! The spreadsheet: a table of cells plus their dependency map

use crate::cell::Cell;
use crate::error::{SheetError, SheetResult};
use crate::options::{EvaluationStrategy, SheetOptions};
use crate::persist;
use ahash::AHashMap;
use fitsheet_core::{CellPosition, CellValue};
use fitsheet_formula::{evaluation_order, CellResolver, CycleChecker, DependencyMap};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Deepest nesting the recursive strategy follows, whatever the options say
pub const RECURSIVE_DEPTH_LIMIT: usize = 512;

/// A spreadsheet
///
/// Every cell in the table has an entry in the dependency map listing the
/// ids its formula reads. Values are never cached between queries: each
/// [`get_value`](Sheet::get_value) evaluates from the stored formulas.
///
/// # Example
///
/// ```rust
/// use fitsheet::prelude::*;
///
/// let mut sheet = Sheet::new();
/// let a1: CellPosition = "A1".parse().unwrap();
/// let b1: CellPosition = "B1".parse().unwrap();
///
/// sheet.set_cell(&a1, "10").unwrap();
/// sheet.set_cell(&b1, "=A1^2").unwrap();
/// assert_eq!(sheet.get_value(&b1), CellValue::Number(100.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    cells: BTreeMap<String, Cell>,
    dependencies: DependencyMap,
    options: SheetOptions,
}

impl Sheet {
    /// Create an empty sheet with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sheet with custom options
    ///
    /// Under [`EvaluationStrategy::Recursive`] the depth limit is capped at
    /// [`RECURSIVE_DEPTH_LIMIT`].
    pub fn with_options(options: SheetOptions) -> Self {
        if options.strategy == EvaluationStrategy::Recursive
            && options.max_dependency_depth > RECURSIVE_DEPTH_LIMIT
        {
            log::warn!(
                "Recursive evaluation limited to depth {} (requested {})",
                RECURSIVE_DEPTH_LIMIT,
                options.max_dependency_depth
            );
        }
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// Set the contents of a cell
    ///
    /// Empty contents are rejected without touching the sheet. Contents that
    /// fail to parse remove whatever the cell held before.
    pub fn set_cell(&mut self, position: &CellPosition, contents: &str) -> SheetResult<()> {
        if contents.is_empty() {
            log::debug!("Rejected empty contents for {}", position);
            return Err(SheetError::EmptyContents);
        }

        match Cell::parse(position.clone(), contents) {
            Ok((cell, dependencies)) => {
                self.insert(position, cell, dependencies);
                Ok(())
            }
            Err(e) => {
                log::debug!("Rejected contents {:?} for {}: {}", contents, position, e);
                self.remove(position);
                Err(e.into())
            }
        }
    }

    /// Evaluate a cell
    ///
    /// Unset cells, cells that reach a circular reference and cells whose
    /// reference chains exceed `max_dependency_depth` evaluate to `Empty`.
    pub fn get_value(&self, position: &CellPosition) -> CellValue {
        let Some(cell) = self.cells.get(position.id()) else {
            return CellValue::Empty;
        };

        if CycleChecker::new(&self.dependencies).contains_cycle(position.id()) {
            log::debug!("Circular reference reachable from {}", position);
            return CellValue::Empty;
        }

        match self.options.strategy {
            EvaluationStrategy::Memoized => self.evaluate_memoized(position),
            EvaluationStrategy::Recursive => self.evaluate_recursive(cell),
        }
    }

    fn evaluate_memoized(&self, position: &CellPosition) -> CellValue {
        let order = match evaluation_order(
            &self.dependencies,
            position.id(),
            self.options.max_dependency_depth,
        ) {
            Ok(order) => order,
            Err(e) => {
                log::warn!("Cannot evaluate {}: {}", position, e);
                return CellValue::Empty;
            }
        };

        let mut memo: AHashMap<&str, CellValue> = AHashMap::with_capacity(order.len());
        for id in order {
            let value = match self.cells.get(id) {
                Some(cell) => {
                    let lookup = |target: &CellPosition| {
                        memo.get(target.id()).cloned().unwrap_or_default()
                    };
                    cell.evaluate(&lookup)
                }
                None => CellValue::Empty,
            };
            memo.insert(id, value);
        }

        memo.remove(position.id()).unwrap_or_default()
    }

    fn evaluate_recursive(&self, cell: &Cell) -> CellValue {
        let resolver = RecursiveResolver {
            sheet: self,
            limit: self.recursive_depth_limit(),
            depth: std::cell::Cell::new(0),
            exceeded: std::cell::Cell::new(false),
        };
        let value = cell.evaluate(&resolver);

        if resolver.exceeded.get() {
            log::warn!(
                "Cannot evaluate {}: reference chain deeper than {}",
                cell.position(),
                resolver.limit
            );
            return CellValue::Empty;
        }
        value
    }

    fn recursive_depth_limit(&self) -> usize {
        self.options.max_dependency_depth.min(RECURSIVE_DEPTH_LIMIT)
    }

    /// Copy a `width` × `height` block of cells from `src` to `dst`
    ///
    /// Formulas are moved the way their references dictate. Unset source
    /// cells clear their destination. The whole source block is read
    /// before anything is written, so overlapping blocks copy cleanly.
    pub fn copy_rect(&mut self, dst: &CellPosition, src: &CellPosition, width: u32, height: u32) {
        log::trace!("Copying {}x{} block from {} to {}", width, height, src, dst);

        let mut snapshot = Vec::new();
        for column in 0..i64::from(width) {
            for row in 0..i64::from(height) {
                let (Some(from), Some(to)) = (src.offset(column, row), dst.offset(column, row))
                else {
                    continue;
                };
                snapshot.push((to, self.cells.get(from.id()).cloned()));
            }
        }

        for (to, source) in snapshot {
            match source {
                Some(cell) => {
                    let (moved, dependencies) = cell.translate(&to);
                    log::trace!("{} -> {}: {}", cell.position(), to, moved.contents());
                    self.insert(&to, moved, dependencies);
                }
                None => {
                    log::trace!("{} cleared", to);
                    self.remove(&to);
                }
            }
        }
    }

    /// Copy a single cell, see [`copy_rect`](Sheet::copy_rect)
    pub fn copy_cell(&mut self, dst: &CellPosition, src: &CellPosition) {
        self.copy_rect(dst, src, 1, 1);
    }

    /// Write the sheet as a checksummed document
    pub fn save<W: Write>(&self, mut writer: W) -> SheetResult<()> {
        let entries = self
            .cells
            .iter()
            .map(|(id, cell)| (id.as_str(), cell.contents()));
        let document = persist::encode(entries, self.options.checksum);

        writer.write_all(document.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Replace the sheet's cells with those of a saved document
    ///
    /// A document that is unreadable or fails its checksum leaves the sheet
    /// untouched. A bad entry in a verified document leaves the sheet empty.
    pub fn load<R: Read>(&mut self, mut reader: R) -> SheetResult<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let document = String::from_utf8(bytes)?;

        let body = persist::verified_body(&document, self.options.checksum).map_err(|e| {
            log::warn!("Refusing to load document: {}", e);
            e
        })?;

        self.clear();
        if let Err(e) = self.apply_entries(body) {
            log::warn!("Malformed document, sheet cleared: {}", e);
            self.clear();
            return Err(e);
        }
        Ok(())
    }

    fn apply_entries(&mut self, body: &str) -> SheetResult<()> {
        for entry in persist::entries(body) {
            let (id, contents) = entry?;
            let position = CellPosition::parse(&id)?;
            self.set_cell(&position, &contents)?;
        }
        Ok(())
    }

    /// Stored contents of a cell
    pub fn contents(&self, position: &CellPosition) -> Option<&str> {
        self.cells.get(position.id()).map(Cell::contents)
    }

    /// Ids the cell's formula reads, in the order they appear
    pub fn dependencies(&self, position: &CellPosition) -> Option<&[String]> {
        self.dependencies.get(position.id()).map(Vec::as_slice)
    }

    /// Positions of all set cells, ordered by id
    pub fn positions(&self) -> impl Iterator<Item = &CellPosition> + '_ {
        self.cells.values().map(Cell::position)
    }

    /// Number of set cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remove every cell
    pub fn clear(&mut self) {
        self.cells.clear();
        self.dependencies.clear();
    }

    fn insert(&mut self, position: &CellPosition, cell: Cell, dependencies: Vec<String>) {
        self.cells.insert(position.id().to_string(), cell);
        self.dependencies.insert(position.id().to_string(), dependencies);
    }

    fn remove(&mut self, position: &CellPosition) {
        self.cells.remove(position.id());
        self.dependencies.remove(position.id());
    }
}

/// Resolves references by evaluating the referenced cell in place
struct RecursiveResolver<'s> {
    sheet: &'s Sheet,
    limit: usize,
    depth: std::cell::Cell<usize>,
    exceeded: std::cell::Cell<bool>,
}

impl CellResolver for RecursiveResolver<'_> {
    fn resolve(&self, target: &CellPosition) -> CellValue {
        let depth = self.depth.get();
        if depth >= self.limit {
            self.exceeded.set(true);
            return CellValue::Empty;
        }

        let Some(cell) = self.sheet.cells.get(target.id()) else {
            return CellValue::Empty;
        };

        self.depth.set(depth + 1);
        let value = cell.evaluate(self);
        self.depth.set(depth);
        value
    }
}
