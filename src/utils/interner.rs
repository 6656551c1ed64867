//! 全局字符串驻留器 (String Interner)
//!
//! 提供高性能的字符串驻留服务，将字符串转换为整数 Symbol 进行比较和哈希。
//! 实例化合批键 (BatchKey) 建立在它之上：相同字符串得到相同 Symbol，
//! 渲染列表按 Symbol 聚合时只做整数比较。

use lasso::{Spur, ThreadedRodeo};
use once_cell::sync::Lazy;

/// 全局字符串驻留器实例
static INTERNER: Lazy<ThreadedRodeo> = Lazy::new(ThreadedRodeo::new);

/// Symbol 类型别名
///
/// Symbol 是一个紧凑的整数标识符，可以高效地进行比较和哈希操作。
pub type Symbol = Spur;

/// 驻留一个字符串，返回其 Symbol
///
/// 如果字符串已存在于驻留池中，返回已有的 Symbol。
/// 如果不存在，将其添加到驻留池并返回新的 Symbol。
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// 尝试获取已存在字符串的 Symbol
///
/// 如果字符串不存在于驻留池中，返回 None。
/// 这个方法不会分配新内存。
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// 将 Symbol 解析回字符串
///
/// 返回驻留池中对应的字符串引用。
///
/// # Panics
/// 如果 Symbol 无效（通常不会发生），会 panic。
#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}
