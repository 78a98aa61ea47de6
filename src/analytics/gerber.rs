//! Gerber 統計量
//!
//! 以門檻 `H_i = c * s_i` 判斷兩個資產是否同時突破：同向突破計 +1，
//! 反向突破計 -1，同時落在門檻內的觀測值從分母扣除（確保半正定）。

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

use super::error::{AnalyticsError, AnalyticsResult};

/// 預設門檻倍數
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Gerber 相關係數與共變異數矩陣
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GerberMatrices {
    pub correlation: Array2<f64>,
    pub covariance: Array2<f64>,
}

/// 逐欄樣本標準差（ddof = 1）
pub fn sample_std(returns: &Array2<f64>) -> Array1<f64> {
    returns.std_axis(Axis(0), 1.0)
}

/// 計算 Gerber 相關係數與共變異數
///
/// `returns` 形狀為 (T 個觀測值, K 個資產)。
pub fn gerber_cor_cov(returns: &Array2<f64>, threshold: f64) -> AnalyticsResult<GerberMatrices> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(AnalyticsError::InvalidThreshold(threshold));
    }
    let (t_obs, k) = returns.dim();
    if t_obs < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: t_obs,
        });
    }

    let s = sample_std(returns);
    let h = s.mapv(|v| threshold * v);

    let mut correlation = Array2::<f64>::zeros((k, k));
    let mut covariance = Array2::<f64>::zeros((k, k));

    for i in 0..k {
        for j in 0..=i {
            let mut concordant = 0i64;
            let mut discordant = 0i64;
            let mut neutral = 0i64;

            for t in 0..t_obs {
                let ri = returns[[t, i]];
                let rj = returns[[t, j]];
                let (hi, hj) = (h[i], h[j]);

                if (ri >= hi && rj >= hj) || (ri <= -hi && rj <= -hj) {
                    concordant += 1;
                } else if (ri >= hi && rj <= -hj) || (ri <= -hi && rj >= hj) {
                    discordant -= 1;
                } else if ri < hi && ri > -hi && rj < hj && rj > -hj {
                    neutral -= 1;
                }
            }

            let cor = (concordant + discordant) as f64 / (t_obs as i64 + neutral) as f64;
            correlation[[i, j]] = cor;
            correlation[[j, i]] = cor;

            let cov = cor * s[i] * s[j];
            covariance[[i, j]] = cov;
            covariance[[j, i]] = cov;
        }
    }

    Ok(GerberMatrices {
        correlation,
        covariance,
    })
}
