//! HTTP clients for the upstream collaborators (vendas, produtos,
//! funcionarios). Each client owns its base URL and per-call timeout; the
//! error taxonomy distinguishes unreachable upstreams from upstream-reported
//! errors and from malformed payloads.

pub mod error;
pub mod funcionarios;
pub mod produtos;
pub mod vendas;

pub use error::FetchError;
pub use funcionarios::FuncionariosClient;
pub use produtos::ProdutosClient;
pub use vendas::{PaginaVendas, VendasClient};
