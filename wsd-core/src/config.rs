//! # Configuração do Desambiguador
//!
//! Parâmetros que controlam a extração de colocações e a construção da
//! lista de decisão. Os valores padrão reproduzem o experimento clássico
//! com a palavra "line" (sentidos "phone" e "product").

use serde::{Deserialize, Serialize};

/// Parâmetros de treino e inferência do modelo de lista de decisão.
///
/// A mesma configuração DEVE ser usada no treino e na inferência: a janela
/// `window` e a palavra-alvo `target` entram na composição das chaves de
/// colocação, e chaves geradas com parâmetros diferentes nunca casam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsdConfig {
    /// A palavra ambígua sendo desambiguada. Entra literalmente nas chaves
    /// de colocação (ex: `"line busy"`), independente da flexão encontrada
    /// no texto.
    pub target: String,
    /// Distância k das colocações de janela (±k). Segundo Yarowsky, valores
    /// entre 20 e 50 são ótimos para ambiguidade semântica.
    pub window: usize,
    /// Constante aditiva de suavização da razão de log-verossimilhança.
    /// Evita divisão por zero quando um sentido nunca co-ocorre com a
    /// colocação. Deve ser estritamente positiva.
    pub alpha: f64,
    /// Sentido de referência usado para desempate (distribuições empatadas
    /// e empates no sentido majoritário).
    pub default_sense: String,
}

impl Default for WsdConfig {
    fn default() -> Self {
        Self {
            target: "line".to_string(),
            window: 30,
            alpha: 0.1,
            default_sense: "phone".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WsdConfig::default();
        assert_eq!(config.target, "line");
        assert_eq!(config.window, 30);
        assert!(config.alpha > 0.0);
    }
}
