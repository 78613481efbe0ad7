pub mod cpf_cache;
