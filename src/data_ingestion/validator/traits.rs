use super::error::{ValidationErrors, ValidationResult};

/// 數據驗證器特徵
pub trait DataValidator<T> {
    /// 驗證器名稱
    fn name(&self) -> &str;

    /// 驗證單個數據項
    fn validate_item(&self, item: &T) -> ValidationResult<()>;

    /// 數據項在來源中的行號
    ///
    /// 預設假設一筆記錄佔一行，從 2 起算（第 1 行為標題列）。
    fn line_of(&self, index: usize, _item: &T) -> usize {
        index + 2
    }

    /// 批量驗證，收集所有錯誤
    fn validate_batch(&self, items: &[T]) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (i, item) in items.iter().enumerate() {
            if let Err(e) = self.validate_item(item) {
                errors.add(self.line_of(i, item), e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
