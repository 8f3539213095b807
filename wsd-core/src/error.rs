//! # Erros do Sistema de Desambiguação
//!
//! Taxonomia de falhas: erros de formato de entrada (fatais, com o
//! identificador do registro problemático), corpus de treino vazio (fatal,
//! o sentido majoritário fica indefinido) e divergência de tamanhos na
//! avaliação (fatal, nunca truncar silenciosamente). A ausência de uma
//! colocação na lista de decisão durante a inferência NÃO é erro: é o caso
//! esperado tratado pelo sentido majoritário.

use thiserror::Error;

/// Erros produzidos pelo núcleo de desambiguação.
#[derive(Error, Debug)]
pub enum WsdError {
    /// Registro do corpus sem id, sem contexto ou sem a palavra-alvo
    /// demarcada por `<head>`.
    #[error("instância malformada no corpus: {id}")]
    MalformedInstance { id: String },

    /// Instância usada em treino sem rótulo de sentido.
    #[error("instância de treino sem rótulo de sentido: {id}")]
    UnlabeledInstance { id: String },

    /// Corpus de treino sem nenhuma instância.
    #[error("corpus de treino vazio: sentido majoritário indefinido")]
    EmptyTrainingSet,

    /// As sequências de respostas previstas e do gabarito têm tamanhos
    /// diferentes.
    #[error("respostas e gabarito divergem em tamanho: {predicted} previstas, {actual} no gabarito")]
    LengthMismatch { predicted: usize, actual: usize },

    /// Linha de resposta sem o atributo `senseid`.
    #[error("linha de resposta sem senseid: {line}")]
    MalformedAnswer { line: String },

    /// Falha de E/S ao persistir ou carregar o modelo.
    #[error("falha de E/S no artefato do modelo")]
    Io(#[from] std::io::Error),

    /// Falha de (des)serialização do artefato do modelo.
    #[error("artefato de modelo inválido")]
    Serialization(#[from] serde_json::Error),
}

/// Alias de conveniência para resultados do núcleo.
pub type WsdResult<T> = Result<T, WsdError>;
