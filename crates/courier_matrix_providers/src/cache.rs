use std::{
    hash::{Hash, Hasher},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use fxhash::FxHasher64;

use crate::{travel_matrices::TravelMatrices, travel_matrix_provider::TravelMatrixProvider};

const CACHE_FOLDER_ENV_VAR: &str = "COURIER_CACHE_FOLDER";

pub trait MatricesCache {
    fn cache<P>(
        &self,
        provider: TravelMatrixProvider,
        points: &[P],
        matrices: &TravelMatrices,
    ) -> anyhow::Result<()>
    where
        for<'a> &'a P: Into<geo_types::Point>;

    fn get_cached<P>(
        &self,
        provider: TravelMatrixProvider,
        points: &[P],
    ) -> anyhow::Result<Option<TravelMatrices>>
    where
        for<'a> &'a P: Into<geo_types::Point>;
}

#[derive(Default, Clone, Copy)]
pub struct NoCache;

impl MatricesCache for NoCache {
    fn cache<P>(
        &self,
        _provider: TravelMatrixProvider,
        _points: &[P],
        _matrices: &TravelMatrices,
    ) -> anyhow::Result<()>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        Ok(())
    }

    fn get_cached<P>(
        &self,
        _provider: TravelMatrixProvider,
        _points: &[P],
    ) -> anyhow::Result<Option<TravelMatrices>>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        Ok(None)
    }
}

fn hash_points<H, P>(points: &[P], hasher: &mut H)
where
    H: Hasher,
    for<'a> &'a P: Into<geo_types::Point>,
{
    points.len().hash(hasher);
    for point in points {
        let point = point.into();
        hasher.write_u64(point.x().to_bits());
        hasher.write_u64(point.y().to_bits());
    }
}

pub fn cache_key<P>(provider: TravelMatrixProvider, points: &[P]) -> String
where
    for<'a> &'a P: Into<geo_types::Point>,
{
    let mut hasher = FxHasher64::default();

    hash_points(points, &mut hasher);
    provider.hash(&mut hasher);

    format!("{:016x}.json", hasher.finish())
}

/// Stores matrices as JSON files inside a folder, one file per point set.
pub struct FileCache {
    folder: PathBuf,
}

impl FileCache {
    pub fn new(folder: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let folder = folder.into();
        if !folder.is_dir() {
            anyhow::bail!("Path {} is not a directory", folder.display());
        }

        Ok(FileCache { folder })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let folder = std::env::var(CACHE_FOLDER_ENV_VAR)?;
        Self::new(folder)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl MatricesCache for FileCache {
    fn cache<P>(
        &self,
        provider: TravelMatrixProvider,
        points: &[P],
        matrices: &TravelMatrices,
    ) -> anyhow::Result<()>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        let filename = cache_key(provider, points);

        let file = std::fs::File::create(self.folder.join(filename))?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        serde_json::to_writer(&mut writer, &matrices)?;
        writer.flush()?;

        Ok(())
    }

    fn get_cached<P>(
        &self,
        provider: TravelMatrixProvider,
        points: &[P],
    ) -> anyhow::Result<Option<TravelMatrices>>
    where
        for<'a> &'a P: Into<geo_types::Point>,
    {
        let file_path = self.folder.join(cache_key(provider, points));

        if !file_path.is_file() {
            return Ok(None);
        }

        let file = std::fs::File::open(file_path)?;
        let matrices: TravelMatrices = serde_json::from_reader(file)?;

        Ok(Some(matrices))
    }
}
