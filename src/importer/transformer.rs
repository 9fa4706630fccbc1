// ==========================================
// IMP 批次导入服务 - 记录派生
// ==========================================
// 职责: 由尾字段派生运行号，插入到尾字段之前
// 规则: run = min(ceil(尾字段 / 除数), 50)
// ==========================================

use crate::domain::batch::{BatchLine, RunRecord, TransformedBatch};
use crate::domain::types::{RunKey, DEFAULT_DIVISION_FACTOR, DERIVED_RUN_CAP, FIELD_SEPARATOR};

// ==========================================
// RecordTransformer - 记录派生器
// ==========================================
pub struct RecordTransformer {
    division_factor: i64,
}

impl RecordTransformer {
    /// 创建派生器
    ///
    /// # 参数
    /// - division_factor: 除数（0 视为未配置，使用默认值 4）
    pub fn new(division_factor: u32) -> Self {
        let factor = if division_factor == 0 {
            DEFAULT_DIVISION_FACTOR
        } else {
            division_factor
        };
        Self {
            division_factor: i64::from(factor),
        }
    }

    pub fn division_factor(&self) -> i64 {
        self.division_factor
    }

    /// 由尾字段派生运行号
    ///
    /// 尾字段无法解析为整数时返回 Undefined（输出为 NaN），不拒绝该行。
    pub fn derive_run_key(&self, trailing: &str) -> RunKey {
        match parse_leading_int(trailing) {
            Some(value) => RunKey::Id(ceil_div(value, self.division_factor).min(DERIVED_RUN_CAP)),
            None => RunKey::Undefined,
        }
    }

    /// 派生单行
    ///
    /// 空白行、字段数 < 2 的行原样保留。
    pub fn transform_line(&self, line: &str) -> BatchLine {
        if line.trim().is_empty() {
            return BatchLine::Passthrough(line.to_string());
        }

        let fields: Vec<String> = line.split(FIELD_SEPARATOR).map(str::to_string).collect();
        if fields.len() < 2 {
            return BatchLine::Passthrough(line.to_string());
        }

        let run = match fields.last() {
            Some(trailing) => self.derive_run_key(trailing.trim()),
            None => RunKey::Undefined,
        };

        BatchLine::Record(RunRecord { fields, run })
    }

    /// 派生整个批次（按 '\n' 切分，保留行尾结构）
    pub fn transform(&self, content: &str) -> TransformedBatch {
        TransformedBatch {
            lines: content.split('\n').map(|line| self.transform_line(line)).collect(),
        }
    }
}

// ==========================================
// 数值辅助
// ==========================================

/// 解析前导整数
///
/// 规则：跳过前导空白，可选正负号，取最长的数字前缀；
/// 没有数字时返回 None。超出 i64 范围时饱和。
///
/// - "40" → 40
/// - " 40kg" → 40
/// - "3.7" → 3
/// - "-12" → -12
/// - "abc" → None
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen_digit = true;
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// 向上取整除法（除数为正）
pub fn ceil_div(value: i64, divisor: i64) -> i64 {
    let quotient = value.div_euclid(divisor);
    if value.rem_euclid(divisor) != 0 {
        quotient + 1
    } else {
        quotient
    }
}
