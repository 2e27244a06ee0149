//! テストユーティリティ
//!
//! 統合テストで共通利用するビルダーを提供する。

mod overtime_test_builder;

pub use overtime_test_builder::{OvertimeTestBuilder, OvertimeTestSetup};
