//! N-Queens as an integer model.
//!
//! One variable per column holds the queen's row. Rows and both diagonals
//! must be pairwise different. The diagonal expressions are shared by every
//! pair they appear in, so they end up in the reference table.

use cpwire_core::{IntExpr, IntVar, Model, Result};

/// An N-Queens model and its row variables, one per column.
#[derive(Debug)]
pub struct NQueens {
    pub model: Model,
    pub queens: Vec<IntVar>,
}

/// Builds the model for an `n`×`n` board.
pub fn nqueens(n: usize) -> Result<NQueens> {
    let mut model = Model::with_name(format!("{n}-queens"));
    let max_row = n as i64 - 1;

    let mut queens = Vec::with_capacity(n);
    let mut ascending: Vec<IntExpr> = Vec::with_capacity(n);
    let mut descending: Vec<IntExpr> = Vec::with_capacity(n);
    for column in 0..n {
        let queen = model.int_var(0, max_row)?;
        ascending.push(model.plus(queen, column as i64)?);
        descending.push(model.minus(queen, column as i64)?);
        queens.push(queen);
    }

    for i in 0..n {
        for j in i + 1..n {
            let row = model.ne(queens[i], queens[j])?;
            let up = model.ne(ascending[i], ascending[j])?;
            let down = model.ne(descending[i], descending[j])?;
            model.enforce_all([row, up, down])?;
        }
    }

    Ok(NQueens { model, queens })
}

/// Counts attacking pairs for a row assignment.
pub fn conflicts(rows: &[i64]) -> usize {
    let mut count = 0;
    for i in 0..rows.len() {
        for j in i + 1..rows.len() {
            let distance = (j - i) as i64;
            if rows[i] == rows[j] || (rows[i] - rows[j]).abs() == distance {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_shape() {
        let queens = nqueens(4).unwrap();
        assert_eq!(queens.queens.len(), 4);
        // 6 pairs, three constraints each
        assert_eq!(queens.model.constraint_count(), 18);
    }

    #[test]
    fn test_conflicts() {
        assert_eq!(conflicts(&[1, 3, 0, 2]), 0);
        assert_eq!(conflicts(&[0, 1, 2, 3]), 6);
        assert_eq!(conflicts(&[0, 0]), 1);
    }
}
