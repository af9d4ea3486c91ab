use crate::data::Error;
use log::{error, info};
use std::path::Path;

/// Makes sure the output directory (and its parents) exists. Calling it on an
/// existing directory is fine; anything else that stops the creation aborts
/// the run.
pub(crate) fn ensure_output_dir(path: &Path) -> Result<(), Error> {
    match std::fs::create_dir_all(path) {
        Ok(()) => {
            info!("Diretório de saída '{}' garantido.", path.display());
            Ok(())
        }
        Err(source) => {
            error!(
                "ERRO CRÍTICO: Não foi possível criar o diretório '{}'. Detalhe: {source}",
                path.display()
            );
            Err(Error::CreateDir {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
